use chrono::NaiveDateTime;
use ratatui::layout::Constraint;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Cell;

use crate::Theme;
use crate::api::KeyId;
use crate::search::Matcher;
use crate::ui::{ColumnDef, TableRow};
use crate::wallet::page::{CopyIcon, KeyEntry, VisibilityIcon};

/// One table row, a snapshot of a [`KeyEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    pub id: KeyId,
    group: String,
    name: String,
    display: String,
    visibility_icon: VisibilityIcon,
    copy_icon: CopyIcon,
    date_added: NaiveDateTime,
}

impl From<&KeyEntry> for KeyRow {
    fn from(entry: &KeyEntry) -> Self {
        Self {
            id: entry.id,
            group: entry.group.clone(),
            name: entry.name.clone(),
            display: entry.display().to_string(),
            visibility_icon: entry.visibility_icon,
            copy_icon: entry.copy_icon,
            date_added: entry.date_added,
        }
    }
}

impl TableRow for KeyRow {
    fn columns() -> &'static [ColumnDef] {
        static COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("Category", Constraint::Length(18)),
            ColumnDef::new("Name", Constraint::Min(16)),
            ColumnDef::new("Key", Constraint::Min(24)),
            ColumnDef::new("", Constraint::Length(3)),
            ColumnDef::new("Added", Constraint::Length(16)),
        ];
        COLUMNS
    }

    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>> {
        let key_style = if matches!(self.visibility_icon, VisibilityIcon::EyeSlash) {
            Style::default().fg(theme.peach())
        } else {
            Style::default().fg(theme.overlay1())
        };
        let copy_style = match self.copy_icon {
            CopyIcon::Copy => Style::default().fg(theme.subtext0()),
            CopyIcon::Check => Style::default()
                .fg(theme.green())
                .add_modifier(Modifier::BOLD),
        };

        vec![
            Cell::from(self.group.clone()).style(Style::default().fg(theme.teal())),
            Cell::from(self.name.clone()),
            Cell::from(self.display.clone()).style(key_style),
            Cell::from(format!(
                "{}{}",
                self.visibility_icon.glyph(),
                self.copy_icon.glyph()
            ))
            .style(copy_style),
            Cell::from(self.date_added.format("%Y-%m-%d %H:%M").to_string())
                .style(Style::default().fg(theme.blue())),
        ]
    }

    fn matches(&self, query: &str) -> bool {
        Matcher::new().matches_any([self.name.as_str(), self.group.as_str()], query)
    }
}
