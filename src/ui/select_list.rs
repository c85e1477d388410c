use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<T> {
    pub label: String,
    pub value: T,
}

impl<T> SelectOption<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent<T> {
    /// An option was chosen; `changed` is false when it was already current.
    Chosen { value: T, changed: bool },
    Cancelled,
}

/// Popup list with one current value, like a `<select>`.
pub struct SelectList<T: Clone + PartialEq> {
    title: String,
    options: Vec<SelectOption<T>>,
    current: T,
    state: ListState,
    resolver: Arc<KeyResolver>,
    area: Rect,
}

impl<T: Clone + PartialEq> SelectList<T> {
    pub fn new(
        title: impl Into<String>,
        options: Vec<SelectOption<T>>,
        current: T,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        let mut state = ListState::default();
        let position = options.iter().position(|o| o.value == current);
        state.select(position.or_else(|| (!options.is_empty()).then_some(0)));
        Self {
            title: title.into(),
            options,
            current,
            state,
            resolver,
            area: Rect::default(),
        }
    }

    pub fn selected(&self) -> Option<&SelectOption<T>> {
        self.state.selected().and_then(|i| self.options.get(i))
    }

    /// Where the popup was last drawn.
    pub const fn area(&self) -> Rect {
        self.area
    }

    fn height(&self) -> u16 {
        u16::try_from(self.options.len() + 2).unwrap_or(u16::MAX)
    }
}

impl<T: Clone + PartialEq> Component for SelectList<T> {
    type Output = SelectEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let last = self.options.len().saturating_sub(1);
        if self.resolver.matches_nav(&key, NavAction::Down) {
            let next = self.state.selected().map_or(0, |i| usize::min(i + 1, last));
            self.state.select(Some(next));
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            let previous = self.state.selected().map_or(0, |i| i.saturating_sub(1));
            self.state.select(Some(previous));
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select(Some(0));
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.state.select(Some(last));
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            return Ok(match self.selected() {
                Some(option) => SelectEvent::Chosen {
                    value: option.value.clone(),
                    changed: option.value != self.current,
                }
                .into(),
                None => EventResult::Consumed,
            });
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(SelectEvent::Cancelled.into());
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(40), Constraint::Length(self.height()));
        self.area = popup_area;
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = self
            .options
            .iter()
            .map(|option| {
                let marker = if option.value == self.current { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.green())),
                    Span::styled(option.label.clone(), Style::default().fg(theme.text())),
                ]))
            })
            .collect();

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, popup_area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn select() -> SelectList<u64> {
        SelectList::new(
            "Category",
            vec![
                SelectOption::new("Uncategorized", 0),
                SelectOption::new("AI", 5),
                SelectOption::new("Payments", 2),
            ],
            5,
            Arc::new(KeyResolver::default()),
        )
    }

    fn press(list: &mut SelectList<u64>, code: KeyCode) -> EventResult<SelectEvent<u64>> {
        list.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn starts_on_current_value() {
        assert_eq!(select().selected().map(|o| o.value), Some(5));
    }

    #[test]
    fn choosing_current_value_is_not_a_change() {
        let mut list = select();
        assert_eq!(
            press(&mut list, KeyCode::Enter),
            EventResult::Event(SelectEvent::Chosen {
                value: 5,
                changed: false
            })
        );
    }

    #[test]
    fn choosing_another_value_is_a_change() {
        let mut list = select();
        press(&mut list, KeyCode::Char('j'));
        assert_eq!(
            press(&mut list, KeyCode::Enter),
            EventResult::Event(SelectEvent::Chosen {
                value: 2,
                changed: true
            })
        );
    }

    #[test]
    fn esc_cancels() {
        let mut list = select();
        assert_eq!(
            press(&mut list, KeyCode::Esc),
            EventResult::Event(SelectEvent::Cancelled)
        );
    }
}
