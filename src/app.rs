use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::command::Command;
use crate::config::{self, GlobalAction, KeyResolver};
use crate::faq::{self, Faq};
use crate::screen::{Screen, UpdateResult};
use crate::theme::{next_theme_name, theme_from_name};
use crate::tui::{Event, Tui};
use crate::ui::{Component, ErrorDialog, ErrorDialogEvent, EventResult, StatusBar};
use crate::wallet::Wallet;

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;
const STATUS_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Wallet,
    Faq,
}

#[derive(Debug)]
enum AppMessage {
    // === Lifecycle ===
    Render,
    Resize(u16, u16),
    /// Hand the terminal back to the shell (Ctrl+Z)
    Suspend,
    Quit,

    // === Feedback ===
    DisplayError(String),
    ClosePopup,
    CycleTheme,

    // === Screens ===
    ShowFaq,
    /// A command finished; the screen that issued it has messages to process
    CommandCompleted {
        route: Route,
        name: String,
        success: bool,
    },
}

pub struct App {
    wallet: Wallet,
    faq: Faq,
    route: Route,
    resolver: Arc<KeyResolver>,
    theme_name: String,
    theme: Theme,
    status_bar: StatusBar,
    error: Option<ErrorDialog>,
    should_quit: bool,
    should_suspend: bool,
    msg_tx: UnboundedSender<AppMessage>,
    msg_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(
        wallet: Wallet,
        resolver: Arc<KeyResolver>,
        theme_name: String,
        server: &str,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            wallet,
            faq: Faq::new(faq::default_entries(), resolver.clone()),
            route: Route::Wallet,
            status_bar: StatusBar::new(server, resolver.clone()),
            resolver,
            theme: theme_from_name(&theme_name),
            theme_name,
            error: None,
            should_quit: false,
            should_suspend: false,
            msg_tx,
            msg_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;

        self.wallet.init();
        self.update_screen(Route::Wallet);

        loop {
            self.handle_events(&mut tui).await;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                self.should_suspend = false;
                tui.suspend()?;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Exiting");
        Ok(())
    }

    fn queue(&self, msg: AppMessage) {
        let _ = self.msg_tx.send(msg);
    }

    fn screen_mut(&mut self, route: Route) -> &mut dyn Screen {
        match route {
            Route::Wallet => &mut self.wallet,
            Route::Faq => &mut self.faq,
        }
    }

    async fn handle_events(&mut self, tui: &mut Tui) {
        let Some(event) = tui.next_event().await else {
            self.should_quit = true;
            return;
        };

        match &event {
            Event::Quit | Event::Closed => self.queue(AppMessage::Quit),
            Event::Tick => self.screen_mut(self.route).handle_tick(),
            Event::Render => self.queue(AppMessage::Render),
            Event::Resize(width, height) => self.queue(AppMessage::Resize(*width, *height)),
            Event::Error(err) => error!(error = %err, "Terminal input error"),
            Event::Paste(text) => debug!(chars = text.chars().count(), "Ignoring paste"),
            Event::Key(key) => self.handle_key(*key),
            Event::Mouse(_) if self.error.is_none() => {
                self.forward_input(&event);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.error {
            match dialog.handle_key(key) {
                Ok(EventResult::Event(ErrorDialogEvent::Dismissed)) => {
                    self.queue(AppMessage::ClosePopup);
                }
                Ok(_) => {}
                Err(err) => error!(error = %err, "Failed to handle key in error dialog"),
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('z') {
            self.queue(AppMessage::Suspend);
            return;
        }

        if self.forward_input(&Event::Key(key)) {
            return;
        }

        let r = &self.resolver;
        if r.matches_global(&key, GlobalAction::Quit) {
            self.queue(AppMessage::Quit);
        } else if r.matches_global(&key, GlobalAction::Faq) {
            self.queue(AppMessage::ShowFaq);
        } else if r.matches_global(&key, GlobalAction::Theme) {
            self.queue(AppMessage::CycleTheme);
        }
    }

    /// Give an input event to the active screen; process its messages if it
    /// took the event.
    fn forward_input(&mut self, event: &Event) -> bool {
        let route = self.route;
        let consumed = self.screen_mut(route).handle_input(event);
        if consumed {
            self.update_screen(route);
        }
        consumed
    }

    fn update_screen(&mut self, route: Route) {
        match self.screen_mut(route).update() {
            UpdateResult::Idle => {}
            UpdateResult::Commands(commands) => {
                for command in commands {
                    self.spawn(route, command);
                }
            }
            UpdateResult::Close => match route {
                Route::Faq => self.route = Route::Wallet,
                Route::Wallet => self.queue(AppMessage::Quit),
            },
            UpdateResult::Error(message) => self.queue(AppMessage::DisplayError(message)),
        }
    }

    fn spawn(&self, route: Route, command: Box<dyn Command>) {
        let name = command.name();
        debug!(command = %name, "Spawning command");
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let success = match command.execute().await {
                Ok(()) => true,
                Err(err) => {
                    error!(command = %name, error = %err, "Command failed");
                    false
                }
            };
            let _ = tx.send(AppMessage::CommandCompleted {
                route,
                name,
                success,
            });
        });
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(msg) = self.msg_rx.try_recv() {
            if !matches!(
                msg,
                AppMessage::Render | AppMessage::CommandCompleted { .. }
            ) {
                debug!(message = ?msg, "Handling message");
            }

            match msg {
                AppMessage::Render => self.render(tui)?,
                AppMessage::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                AppMessage::Suspend => self.should_suspend = true,
                AppMessage::Quit => self.should_quit = true,
                AppMessage::DisplayError(message) => {
                    self.error = Some(ErrorDialog::new(message, self.resolver.clone()));
                }
                AppMessage::ClosePopup => self.error = None,
                AppMessage::CycleTheme => self.cycle_theme(),
                AppMessage::ShowFaq => self.route = Route::Faq,
                AppMessage::CommandCompleted {
                    route,
                    name,
                    success,
                } => {
                    debug!(command = %name, success, "Command completed");
                    self.update_screen(route);
                }
            }
        }
        Ok(())
    }

    fn cycle_theme(&mut self) {
        let name = next_theme_name(&self.theme_name);
        info!(theme = name, "Switching theme");
        self.theme = theme_from_name(name);
        name.clone_into(&mut self.theme_name);
        if let Err(err) = config::save_theme(name) {
            warn!(error = %err, "Failed to save theme");
        }
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let theme = self.theme;
        let route = self.route;
        tui.draw(|frame| {
            frame.render_widget(
                Block::default().style(Style::default().bg(theme.base()).fg(theme.text())),
                frame.area(),
            );

            let [main, status] = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(StatusBar::height(STATUS_ROWS)),
            ])
            .areas(frame.area());

            let screen = self.screen_mut(route);
            screen.view(frame, main, &theme);
            let title = screen.title();
            let keybindings = screen.keybindings();
            self.status_bar
                .render(frame, status, &theme, &title, &keybindings);

            if let Some(dialog) = &mut self.error {
                dialog.render(frame, frame.area(), &theme);
            }
        })?;
        Ok(())
    }
}
