use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver, NavAction};
use crate::ui::Keybinding;

const STATUS_WIDTH: u16 = 40;

/// Bottom bar: connection info on the left, key hints on the right.
pub struct StatusBar {
    server: String,
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub fn new(server: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            server: server.into(),
            resolver,
        }
    }

    /// Height needed to show `rows` hint rows inside the border.
    pub const fn height(rows: u16) -> u16 {
        rows + 2
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        screen: &str,
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [status_area, hints_area] =
            Layout::horizontal([Constraint::Length(STATUS_WIDTH), Constraint::Min(20)])
                .areas(inner);

        let w = status_area.width as usize;
        let label_style = Style::default().fg(theme.overlay1());
        let lines = vec![
            Line::from(Span::styled(
                truncate_str(screen, w),
                Style::default()
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("server ", label_style),
                Span::styled(
                    truncate_str(&self.server, w.saturating_sub(7)),
                    Style::default().fg(theme.text()),
                ),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), status_area);

        let global = self.global_keybindings();
        let hints: Vec<&Keybinding> = local_keybindings.iter().chain(global.iter()).collect();
        render_hints(frame, hints_area, theme, &hints);
    }

    fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(
                format!(
                    "{}/{}",
                    self.resolver.display_nav(NavAction::Up),
                    self.resolver.display_nav(NavAction::Down)
                ),
                "Navigate",
            ),
            Keybinding::new(self.resolver.display_global(GlobalAction::Faq), "FAQ"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Theme), "Theme"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
        ]
    }
}

/// Lay hints out column by column so the separators line up.
fn render_hints(frame: &mut Frame, area: Rect, theme: &Theme, hints: &[&Keybinding]) {
    if hints.is_empty() || area.height == 0 {
        return;
    }

    let max_key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
    let max_desc_w = hints
        .iter()
        .map(|kb| kb.description.chars().count())
        .max()
        .unwrap_or(1);
    // key + " │ " + desc + gap
    let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
    let num_cols = (area.width / col_width).max(1) as usize;
    let num_rows = area.height as usize;

    let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
    for (i, kb) in hints.iter().enumerate() {
        let col = i / num_rows;
        if col >= num_cols {
            break;
        }
        columns[col].push(Line::from(vec![
            Span::styled(
                format!("{:>max_key_w$}", kb.key),
                Style::default().fg(theme.peach()),
            ),
            Span::styled(" │ ", Style::default().fg(theme.surface2())),
            Span::styled(kb.description.clone(), Style::default().fg(theme.subtext0())),
        ]));
    }

    let col_areas = Layout::horizontal(vec![Constraint::Length(col_width); num_cols]).split(area);
    for (lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
        frame.render_widget(Paragraph::new(lines), *col_area);
    }
}

/// Truncate to `max_width` characters, marking the cut with "...".
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_str("wallet", 10), "wallet");
        assert_eq!(truncate_str("https://wallet.example.com", 10), "https:/...");
        assert_eq!(truncate_str("ééééé", 4), "é...");
    }
}
