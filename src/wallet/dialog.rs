//! Modals of the wallet screen.
//!
//! Each dialog targets one key and translates its component's output into a
//! [`WalletMsg`]. Dialogs remember where they were last drawn so a click can
//! be told apart from a click on the backdrop.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Position, Rect};

use crate::Theme;
use crate::api::{Category, CategoryId, KeyId, UNCATEGORIZED_NAME};
use crate::config::KeyResolver;
use crate::ui::{
    Component, ConfirmDialog, ConfirmEvent, EventResult, Result, SelectEvent, SelectList,
    SelectOption, TextInput, TextInputEvent,
};
use crate::wallet::WalletMsg;

/// Rename form, pre-filled with the key's current name.
pub struct EditDialog {
    key_id: KeyId,
    input: TextInput,
}

impl EditDialog {
    pub fn new(key_id: KeyId, key_name: &str) -> Self {
        Self {
            key_id,
            input: TextInput::new("Edit key name")
                .with_value(key_name)
                .with_placeholder("Key name"),
        }
    }

    #[cfg(test)]
    pub const fn key_id(&self) -> KeyId {
        self.key_id
    }

    #[cfg(test)]
    pub fn key_name(&self) -> &str {
        self.input.value()
    }
}

/// Delete confirmation. The key it targets is the wallet's pending delete.
pub struct DeleteDialog {
    confirm: ConfirmDialog,
}

impl DeleteDialog {
    pub fn new(key_name: &str, resolver: Arc<KeyResolver>) -> Self {
        Self {
            confirm: ConfirmDialog::new(
                format!("Are you sure you want to delete \"{key_name}\"?"),
                resolver,
            )
            .with_title("Delete API key")
            .with_confirm_text("Delete")
            .with_cancel_text("Cancel"),
        }
    }
}

/// "Uncategorized" first, then the user's categories.
fn category_options(categories: &[Category]) -> Vec<SelectOption<CategoryId>> {
    std::iter::once(SelectOption::new(
        UNCATEGORIZED_NAME,
        CategoryId::UNCATEGORIZED,
    ))
    .chain(categories.iter().map(|c| SelectOption::new(c.name.clone(), c.id)))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddStep {
    Name,
    Secret,
    Category,
}

/// Add form, filled one field at a time: name, secret, then category.
/// Empty names and secrets are not accepted.
pub struct AddDialog {
    step: AddStep,
    name: TextInput,
    secret: TextInput,
    category: SelectList<CategoryId>,
    key_name: String,
    api_key: String,
}

impl AddDialog {
    pub fn new(current: CategoryId, categories: &[Category], resolver: Arc<KeyResolver>) -> Self {
        Self {
            step: AddStep::Name,
            name: TextInput::new("New key name").with_placeholder("Key name"),
            secret: TextInput::new("New key secret")
                .with_placeholder("API key")
                .masked(),
            category: SelectList::new(
                "Category of the new key",
                category_options(categories),
                current,
                resolver,
            ),
            key_name: String::new(),
            api_key: String::new(),
        }
    }

    #[cfg(test)]
    pub const fn step(&self) -> AddStep {
        self.step
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<WalletMsg>> {
        let input = match self.step {
            AddStep::Name => &mut self.name,
            AddStep::Secret => &mut self.secret,
            AddStep::Category => return self.choose_category(key),
        };

        Ok(match input.handle_key(key)? {
            EventResult::Event(TextInputEvent::Submitted(value)) => {
                let value = value.trim();
                if value.is_empty() {
                    return Ok(None);
                }
                if self.step == AddStep::Name {
                    value.clone_into(&mut self.key_name);
                    self.step = AddStep::Secret;
                } else {
                    value.clone_into(&mut self.api_key);
                    self.step = AddStep::Category;
                }
                None
            }
            EventResult::Event(TextInputEvent::Cancelled) => Some(WalletMsg::CancelAdd),
            EventResult::Consumed | EventResult::Ignored => None,
        })
    }

    /// Any choice submits the form, including the preselected category.
    fn choose_category(&mut self, key: KeyEvent) -> Result<Option<WalletMsg>> {
        Ok(match self.category.handle_key(key)? {
            EventResult::Event(SelectEvent::Chosen { value, .. }) => Some(WalletMsg::SubmitAdd {
                key_name: self.key_name.clone(),
                api_key: self.api_key.clone(),
                category: value,
            }),
            EventResult::Event(SelectEvent::Cancelled) => Some(WalletMsg::CancelAdd),
            EventResult::Consumed | EventResult::Ignored => None,
        })
    }

    const fn area(&self) -> Rect {
        match self.step {
            AddStep::Name => self.name.area(),
            AddStep::Secret => self.secret.area(),
            AddStep::Category => self.category.area(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self.step {
            AddStep::Name => self.name.render(frame, area, theme),
            AddStep::Secret => self.secret.render(frame, area, theme),
            AddStep::Category => self.category.render(frame, area, theme),
        }
    }
}

/// Category selector for an existing key.
pub struct CategoryDialog {
    key_id: KeyId,
    select: SelectList<CategoryId>,
}

impl CategoryDialog {
    pub fn new(
        key_id: KeyId,
        current: CategoryId,
        categories: &[Category],
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            key_id,
            select: SelectList::new(
                "Move to category",
                category_options(categories),
                current,
                resolver,
            ),
        }
    }
}

/// The modal currently covering the wallet, if any.
pub enum WalletModal {
    Add(AddDialog),
    Edit(EditDialog),
    Delete(DeleteDialog),
    Category(CategoryDialog),
}

impl WalletModal {
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Option<WalletMsg>> {
        Ok(match self {
            Self::Add(dialog) => dialog.handle_key(key)?,
            Self::Edit(dialog) => match dialog.input.handle_key(key)? {
                EventResult::Event(TextInputEvent::Submitted(key_name)) => {
                    Some(WalletMsg::SubmitEdit {
                        id: dialog.key_id,
                        key_name,
                    })
                }
                EventResult::Event(TextInputEvent::Cancelled) => Some(WalletMsg::CancelEdit),
                EventResult::Consumed | EventResult::Ignored => None,
            },
            Self::Delete(dialog) => match dialog.confirm.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => Some(WalletMsg::ConfirmDelete),
                EventResult::Event(ConfirmEvent::Cancelled) => Some(WalletMsg::CancelDelete),
                EventResult::Consumed | EventResult::Ignored => None,
            },
            Self::Category(dialog) => match dialog.select.handle_key(key)? {
                EventResult::Event(SelectEvent::Chosen {
                    value,
                    changed: true,
                }) => Some(WalletMsg::ChangeCategory {
                    id: dialog.key_id,
                    category_id: value,
                }),
                EventResult::Event(SelectEvent::Chosen { changed: false, .. } | SelectEvent::Cancelled) => {
                    Some(WalletMsg::CancelCategorySelect)
                }
                EventResult::Consumed | EventResult::Ignored => None,
            },
        })
    }

    /// Where the modal was last drawn; empty until the first render.
    pub const fn area(&self) -> Rect {
        match self {
            Self::Add(dialog) => dialog.area(),
            Self::Edit(dialog) => dialog.input.area(),
            Self::Delete(dialog) => dialog.confirm.area(),
            Self::Category(dialog) => dialog.select.area(),
        }
    }

    /// Whether a click at `position` landed outside the modal. Nothing counts
    /// as outside before the modal has been drawn.
    pub fn is_backdrop(&self, position: Position) -> bool {
        let area = self.area();
        !area.is_empty() && !area.contains(position)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self {
            Self::Add(dialog) => dialog.render(frame, area, theme),
            Self::Edit(dialog) => dialog.input.render(frame, area, theme),
            Self::Delete(dialog) => dialog.confirm.render(frame, area, theme),
            Self::Category(dialog) => dialog.select.render(frame, area, theme),
        }
    }
}
