//! The FAQ screen: an accordion of questions whose answers open and close
//! independently of each other.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::Theme;
use crate::config::{FaqAction, GlobalAction, KeyResolver, NavAction};
use crate::screen::{Screen, UpdateResult};
use crate::tui::Event;
use crate::ui::Keybinding;

const ANSWER_INDENT: u16 = 4;

/// One question of the accordion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
    active: bool,
}

impl FaqEntry {
    pub const fn new(question: &'static str, answer: &'static str) -> Self {
        Self {
            question,
            answer,
            active: false,
        }
    }

    /// Whether the answer is shown.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub const fn toggle(&mut self) {
        self.active = !self.active;
    }
}

pub fn default_entries() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new(
            "What is API Key Wallet?",
            "A single place for the API keys you use across services. Keys are \
             encrypted on the server and only decrypted when you reveal or copy one.",
        ),
        FaqEntry::new(
            "How do I see a stored key?",
            "Select it and press v. The key is fetched from the server and shown in \
             place of the dots. Press v again to hide it.",
        ),
        FaqEntry::new(
            "What happens when I copy a key?",
            "The key is fetched and written to the system clipboard. The copy icon \
             turns into a check mark for a second.",
        ),
        FaqEntry::new(
            "How do I organize my keys?",
            "Press c to move a key to another category or back to Uncategorized. \
             Use [ and ] to show one category at a time.",
        ),
        FaqEntry::new(
            "Can I undo a delete?",
            "No. Deleting removes the key from the server, so you are asked to \
             confirm first.",
        ),
        FaqEntry::new(
            "Does the client keep my keys?",
            "No. A revealed key only lives in memory while it is shown, and reloading \
             the wallet masks every key again.",
        ),
    ]
}

enum FaqMsg {
    Toggle(usize),
    Close,
}

/// An entry laid out for the current width.
struct EntryView {
    question: Paragraph<'static>,
    question_height: u16,
    answer: Option<(Paragraph<'static>, u16)>,
}

impl EntryView {
    /// Open answers are followed by a blank line.
    fn height(&self) -> u16 {
        let answer = self
            .answer
            .as_ref()
            .map_or(0, |(_, height)| height.saturating_add(1));
        self.question_height.saturating_add(answer)
    }
}

fn wrapped_height(paragraph: &Paragraph, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width)).unwrap_or(u16::MAX)
}

pub struct Faq {
    entries: Vec<FaqEntry>,
    selected: usize,
    /// First entry drawn; moves so the selected entry stays on screen.
    offset: usize,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<FaqMsg>,
    msg_rx: UnboundedReceiver<FaqMsg>,
}

impl Faq {
    pub fn new(entries: Vec<FaqEntry>, resolver: Arc<KeyResolver>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            entries,
            selected: 0,
            offset: 0,
            resolver,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: FaqMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(last) = self.entries.len().checked_sub(1) else {
            return;
        };
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let r = &self.resolver;
        if r.matches_global(key, GlobalAction::Back) {
            self.queue(FaqMsg::Close);
        } else if r.matches_faq(key, FaqAction::Toggle) {
            if !self.entries.is_empty() {
                self.queue(FaqMsg::Toggle(self.selected));
            }
        } else if r.matches_nav(key, NavAction::Down) {
            self.move_selection(1);
        } else if r.matches_nav(key, NavAction::Up) {
            self.move_selection(-1);
        } else if r.matches_nav(key, NavAction::Home) {
            self.move_selection(isize::MIN);
        } else if r.matches_nav(key, NavAction::End) {
            self.move_selection(isize::MAX);
        } else {
            return false;
        }
        true
    }

    fn entry_view(
        entry: &FaqEntry,
        selected: bool,
        width: u16,
        answer_width: u16,
        theme: &Theme,
    ) -> EntryView {
        let (marker, question_style) = if entry.is_active() {
            (
                "▾ ",
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("▸ ", Style::default().fg(theme.text()))
        };
        let background = if selected {
            Style::default().bg(theme.selection_bg())
        } else {
            Style::default()
        };

        let question = Paragraph::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.overlay1())),
            Span::styled(entry.question, question_style),
        ]))
        .style(background)
        .wrap(Wrap { trim: true });
        let question_height = wrapped_height(&question, width);

        let answer = entry.is_active().then(|| {
            let answer = Paragraph::new(entry.answer)
                .style(Style::default().fg(theme.subtext0()))
                .wrap(Wrap { trim: true });
            let height = wrapped_height(&answer, answer_width);
            (answer, height)
        });

        EntryView {
            question,
            question_height,
            answer,
        }
    }

    /// Scroll just far enough that the selected entry is drawn in full, or
    /// at least from its first line.
    fn scroll_to_selection(&mut self, views: &[EntryView], height: u16) {
        self.offset = self.offset.min(self.selected);
        while self.offset < self.selected {
            let needed: u32 = views[self.offset..=self.selected]
                .iter()
                .map(|view| u32::from(view.height()))
                .sum();
            if needed <= u32::from(height) {
                break;
            }
            self.offset += 1;
        }
    }
}

impl Screen for Faq {
    fn handle_input(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => false,
        }
    }

    fn update(&mut self) -> UpdateResult {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                FaqMsg::Toggle(index) => match self.entries.get_mut(index) {
                    Some(entry) => entry.toggle(),
                    None => warn!(index, "No FAQ entry at index"),
                },
                FaqMsg::Close => return UpdateResult::Close,
            }
        }
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Frequently asked questions ")
            .title_style(Style::default().fg(theme.header()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [_, answer_column] =
            Layout::horizontal([Constraint::Length(ANSWER_INDENT), Constraint::Fill(1)])
                .areas(inner);

        let views: Vec<EntryView> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Self::entry_view(entry, i == self.selected, inner.width, answer_column.width, theme)
            })
            .collect();
        self.scroll_to_selection(&views, inner.height);

        let mut y = inner.y;
        for view in views.into_iter().skip(self.offset) {
            if y >= inner.bottom() {
                break;
            }
            let question_area =
                Rect::new(inner.x, y, inner.width, view.question_height).intersection(inner);
            frame.render_widget(view.question, question_area);
            y = y.saturating_add(view.question_height);

            if let Some((answer, height)) = view.answer {
                let answer_area = Rect::new(answer_column.x, y, answer_column.width, height)
                    .intersection(inner);
                frame.render_widget(answer, answer_area);
                y = y.saturating_add(height).saturating_add(1);
            }
        }
    }

    fn title(&self) -> String {
        "FAQ".to_string()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_faq(FaqAction::Toggle), "Show/Hide answer"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Back), "Back"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn press(faq: &mut Faq, code: KeyCode) -> UpdateResult {
        faq.handle_input(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        faq.update()
    }

    fn active(faq: &Faq) -> Vec<bool> {
        faq.entries.iter().map(FaqEntry::is_active).collect()
    }

    fn faq() -> Faq {
        Faq::new(default_entries(), Arc::new(KeyResolver::default()))
    }

    /// Screen rows after drawing the FAQ on a `width` x `height` terminal.
    fn draw(faq: &mut Faq, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| faq.view(frame, frame.area(), &Theme::default()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn entries_start_closed() {
        assert!(active(&faq()).iter().all(|a| !a));
    }

    #[test]
    fn entries_toggle_independently() {
        let mut faq = faq();

        press(&mut faq, KeyCode::Enter);
        press(&mut faq, KeyCode::Char('j'));
        press(&mut faq, KeyCode::Char(' '));

        assert_eq!(&active(&faq)[..3], &[true, true, false]);

        press(&mut faq, KeyCode::Char('k'));
        press(&mut faq, KeyCode::Enter);

        assert_eq!(&active(&faq)[..3], &[false, true, false]);
    }

    #[test]
    fn back_closes_the_screen() {
        let mut faq = faq();
        assert!(matches!(press(&mut faq, KeyCode::Esc), UpdateResult::Close));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut faq = faq();
        press(&mut faq, KeyCode::Char('k'));
        assert_eq!(faq.selected, 0);

        press(&mut faq, KeyCode::Char('G'));
        press(&mut faq, KeyCode::Char('j'));
        assert_eq!(faq.selected, faq.entries.len() - 1);
    }

    #[test]
    fn open_answer_wraps_below_its_question_indented() {
        let mut faq = faq();
        press(&mut faq, KeyCode::Enter);

        let rows = draw(&mut faq, 40, 16);

        let first = rows
            .iter()
            .position(|row| row.contains("A single place"))
            .unwrap();
        assert!(rows[first - 1].contains("What is API Key Wallet?"));
        assert!(rows[first].starts_with("│    A single"));
        assert!(rows[first + 1..].iter().any(|row| row.contains("decrypted")));
        assert!(rows[first + 1].starts_with("│    "));
    }

    #[test]
    fn closed_answers_are_not_drawn() {
        let mut faq = faq();
        let rows = draw(&mut faq, 60, 12);

        assert!(rows.iter().any(|row| row.contains("Can I undo a delete?")));
        assert!(!rows.iter().any(|row| row.contains("A single place")));
    }

    #[test]
    fn selection_scrolls_into_view() {
        let mut faq = faq();
        press(&mut faq, KeyCode::Char('G'));

        let rows = draw(&mut faq, 40, 6);

        assert!(rows.iter().any(|row| row.contains("Does the client keep my keys?")));
        assert!(!rows.iter().any(|row| row.contains("What is API Key Wallet?")));
    }
}
