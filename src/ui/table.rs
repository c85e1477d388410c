use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table as RatatuiTable, TableState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent<T> {
    Activated(T),
}

pub struct ColumnDef {
    pub header: &'static str,
    pub constraint: Constraint,
}

impl ColumnDef {
    pub const fn new(header: &'static str, constraint: Constraint) -> Self {
        Self { header, constraint }
    }
}

pub trait TableRow {
    fn columns() -> &'static [ColumnDef];
    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>>;

    /// Return true if this row matches the search query.
    fn matches(&self, query: &str) -> bool;
}

/// Selectable table with a `/` search that narrows the rows locally.
pub struct Table<T: TableRow + Clone> {
    items: Vec<T>,
    filtered_indices: Vec<usize>,
    state: TableState,
    title: String,
    searching: bool,
    query: String,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone> Table<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut table = Self {
            items,
            filtered_indices: Vec::new(),
            state: TableState::default(),
            title: String::new(),
            searching: false,
            query: String::new(),
            resolver,
        };
        table.update_filter();
        table
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the rows, keeping the selection position where possible.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.update_filter();
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.state
            .selected()
            .and_then(|selected| self.filtered_indices.get(selected))
            .and_then(|&idx| self.items.get(idx))
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    fn update_filter(&mut self) {
        self.filtered_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.query.is_empty() || item.matches(&self.query))
            .map(|(i, _)| i)
            .collect();

        if self.filtered_indices.is_empty() {
            self.state.select(None);
        } else if self
            .state
            .selected()
            .is_none_or(|i| i >= self.filtered_indices.len())
        {
            self.state.select(Some(0));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let last = self.filtered_indices.len() - 1;
        let next = self
            .state
            .selected()
            .map_or(0, |i| i.saturating_add_signed(delta).min(last));
        self.state.select(Some(next));
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            self.query.clear();
            self.update_filter();
            return EventResult::Consumed;
        }

        // Enter leaves search but keeps the filter
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return EventResult::Consumed;
        }

        match key.code {
            KeyCode::Backspace => {
                self.query.pop();
                self.update_filter();
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.update_filter();
            }
            _ => {}
        }
        EventResult::Consumed
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.move_selection(1);
            return EventResult::Consumed;
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.move_selection(-1);
            return EventResult::Consumed;
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.move_selection(10);
            return EventResult::Consumed;
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.move_selection(-10);
            return EventResult::Consumed;
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.move_selection(isize::MIN);
            return EventResult::Consumed;
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.move_selection(isize::MAX);
            return EventResult::Consumed;
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            return self
                .selected_item()
                .map_or(EventResult::Ignored, |item| {
                    TableEvent::Activated(item.clone()).into()
                });
        }
        if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            return EventResult::Consumed;
        }
        if self.resolver.matches_search(&key, SearchAction::Exit) && !self.query.is_empty() {
            self.query.clear();
            self.update_filter();
            return EventResult::Consumed;
        }

        EventResult::Ignored
    }
}

impl<T: TableRow + Clone> Component for Table<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let has_search_bar = self.searching || !self.query.is_empty();
        let (table_area, search_area) = if has_search_bar {
            let [table, search] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            (table, Some(search))
        } else {
            (area, None)
        };

        let columns = T::columns();

        let header = Row::new(columns.iter().map(|c| {
            Cell::from(c.header).style(
                Style::default()
                    .fg(theme.header())
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .style(Style::default().bg(theme.surface0()));

        let rows: Vec<Row> = self
            .filtered_indices
            .iter()
            .map(|&idx| {
                Row::new(self.items[idx].render_cells(theme))
                    .style(Style::default().fg(theme.text()))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            );

        let table = RatatuiTable::new(rows, columns.iter().map(|c| c.constraint))
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, table_area, &mut self.state);

        if let Some(search_area) = search_area {
            let (text, style) = if self.searching {
                (
                    format!("/{}_", self.query),
                    Style::default().fg(theme.yellow()),
                )
            } else {
                (
                    format!("/{} ({} matches)", self.query, self.filtered_indices.len()),
                    Style::default().fg(theme.subtext0()),
                )
            };
            frame.render_widget(Paragraph::new(text).style(style), search_area);
        }
    }
}
