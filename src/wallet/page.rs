//! The wallet page: what a wallet load renders, and the per-key display state
//! the interactions mutate.

use chrono::NaiveDateTime;

use crate::api::{Category, CategoryId, KeyId, UNCATEGORIZED_NAME, WalletListing};

/// Placeholder shown instead of a secret.
pub const MASKED_KEY: &str = "••••••••••••••••";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityIcon {
    /// Secret hidden, the button offers to show it.
    Eye,
    /// Secret shown, the button offers to hide it.
    EyeSlash,
}

impl VisibilityIcon {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Eye => "◉",
            Self::EyeSlash => "◌",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyIcon {
    Copy,
    /// Shown briefly after a successful copy.
    Check,
}

impl CopyIcon {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Copy => "⧉",
            Self::Check => "✓",
        }
    }
}

/// One key as displayed on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub id: KeyId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub group: String,
    pub date_added: NaiveDateTime,
    display: String,
    pub visibility_icon: VisibilityIcon,
    pub copy_icon: CopyIcon,
}

impl KeyEntry {
    fn new(key: crate::api::ApiKey, group: &str) -> Self {
        Self {
            id: key.id,
            name: key.key_name,
            category_id: key.category_id,
            group: group.to_string(),
            date_added: key.date_added,
            display: MASKED_KEY.to_string(),
            visibility_icon: VisibilityIcon::Eye,
            copy_icon: CopyIcon::Copy,
        }
    }

    /// The text currently shown in the key column.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.visibility_icon, VisibilityIcon::EyeSlash)
    }

    pub fn reveal(&mut self, secret: String) {
        self.display = secret;
        self.visibility_icon = VisibilityIcon::EyeSlash;
    }

    pub fn mask(&mut self) {
        MASKED_KEY.clone_into(&mut self.display);
        self.visibility_icon = VisibilityIcon::Eye;
    }

    /// Category as the selector shows it, with "Uncategorized" as id 0.
    pub fn selected_category(&self) -> CategoryId {
        self.category_id.unwrap_or(CategoryId::UNCATEGORIZED)
    }
}

/// A named block of keys on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGroup {
    pub name: String,
    pub entries: Vec<KeyEntry>,
}

/// Which keys a wallet load shows, like the server's `/wallet/<category_id>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    pub const fn from_cli(category: Option<u64>) -> Self {
        match category {
            Some(id) => Self::Only(CategoryId(id)),
            None => Self::All,
        }
    }

    fn admits(self, category_id: Option<CategoryId>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) if wanted.is_uncategorized() => category_id.is_none(),
            Self::Only(wanted) => category_id == Some(wanted),
        }
    }

    /// Cycles All → each category → Uncategorized → All.
    pub fn step(self, categories: &[Category], forward: bool) -> Self {
        let mut options = vec![Self::All];
        options.extend(categories.iter().map(|c| Self::Only(c.id)));
        options.push(Self::Only(CategoryId::UNCATEGORIZED));

        let position = options.iter().position(|o| *o == self).unwrap_or(0);
        let len = options.len();
        let next = if forward {
            (position + 1) % len
        } else {
            (position + len - 1) % len
        };
        options[next]
    }

    pub fn label(self, categories: &[Category]) -> String {
        match self {
            Self::All => "All keys".to_string(),
            Self::Only(id) if id.is_uncategorized() => UNCATEGORIZED_NAME.to_string(),
            Self::Only(id) => categories
                .iter()
                .find(|c| c.id == id)
                .map_or_else(|| format!("Category {id}"), |c| c.name.clone()),
        }
    }
}

/// Everything a wallet load displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletPage {
    pub categories: Vec<Category>,
    pub groups: Vec<KeyGroup>,
    pub filter: CategoryFilter,
}

impl WalletPage {
    /// Lays out a listing: categories by name, "Uncategorized" last, keys by
    /// name ignoring case, empty groups dropped.
    pub fn build(listing: WalletListing, filter: CategoryFilter) -> Self {
        let WalletListing {
            mut categories,
            mut grouped_keys,
        } = listing;
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        let mut order: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        let mut unknown: Vec<String> = grouped_keys
            .keys()
            .filter(|name| *name != UNCATEGORIZED_NAME && !order.contains(*name))
            .cloned()
            .collect();
        unknown.sort();
        order.extend(unknown);
        order.push(UNCATEGORIZED_NAME.to_string());

        let groups = order
            .into_iter()
            .filter_map(|name| {
                let mut keys = grouped_keys.remove(&name)?;
                keys.retain(|key| filter.admits(key.category_id));
                keys.sort_by_key(|key| key.key_name.to_lowercase());
                let entries: Vec<KeyEntry> =
                    keys.into_iter().map(|key| KeyEntry::new(key, &name)).collect();
                (!entries.is_empty()).then_some(KeyGroup { name, entries })
            })
            .collect();

        Self {
            categories,
            groups,
            filter,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &KeyEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    pub fn entry(&self, id: KeyId) -> Option<&KeyEntry> {
        self.entries().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: KeyId) -> Option<&mut KeyEntry> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.entries.iter_mut())
            .find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
