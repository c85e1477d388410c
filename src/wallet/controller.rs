use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, warn};

use crate::Theme;
use crate::api::{CategoryId, KeyId, WalletApi, WalletListing};
use crate::command::{ClipboardSink, Command};
use crate::config::{DialogAction, KeyResolver, NavAction, SearchAction, WalletAction};
use crate::screen::{Screen, UpdateResult};
use crate::tui::Event;
use crate::ui::{Component, EventResult, Keybinding, Spinner, Table, TableEvent};
use crate::wallet::command::{
    AddKeyCmd, CopyFlashCmd, CopyKeyCmd, DeleteKeyCmd, EditKeyCmd, FetchWalletCmd, RevealKeyCmd,
    UpdateCategoryCmd,
};
use crate::wallet::dialog::{AddDialog, CategoryDialog, DeleteDialog, EditDialog, WalletModal};
use crate::wallet::page::{CategoryFilter, CopyIcon, KeyEntry, WalletPage};
use crate::wallet::view::KeyRow;
use crate::wallet::WalletMsg;

/// How long the copy button shows the check mark.
pub const COPY_FLASH: Duration = Duration::from_millis(1000);

/// The wallet screen: one handler per key interaction, bound to the page
/// built from the last load.
pub struct Wallet {
    api: Arc<dyn WalletApi>,
    clipboard: Arc<dyn ClipboardSink>,
    resolver: Arc<KeyResolver>,
    filter: CategoryFilter,
    loading: bool,
    spinner: Spinner,
    page: WalletPage,
    table: Table<KeyRow>,
    modal: Option<WalletModal>,
    /// Key targeted by the open delete confirmation.
    pending_delete: Option<KeyId>,
    /// Copy feedback timers still running, per key.
    copy_flashes: HashMap<KeyId, usize>,
    copy_flash: Duration,
    /// Bumped whenever the page is rebuilt. Results of requests made
    /// against an older page are dropped.
    generation: u64,
    msg_tx: UnboundedSender<WalletMsg>,
    msg_rx: UnboundedReceiver<WalletMsg>,
}

impl Wallet {
    pub fn new(
        api: Arc<dyn WalletApi>,
        clipboard: Arc<dyn ClipboardSink>,
        resolver: Arc<KeyResolver>,
        filter: CategoryFilter,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            api,
            clipboard,
            table: Table::new(Vec::new(), resolver.clone()),
            resolver,
            filter,
            loading: false,
            spinner: Spinner::new("Loading wallet..."),
            page: WalletPage::default(),
            modal: None,
            pending_delete: None,
            copy_flashes: HashMap::new(),
            copy_flash: COPY_FLASH,
            generation: 0,
            msg_tx,
            msg_rx,
        }
    }

    /// Queue a message to be processed by update().
    fn queue(&self, msg: WalletMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn selected_key(&self) -> Option<KeyId> {
        self.table.selected_item().map(|row| row.id)
    }

    /// Look up a key on the page, logging when it is not there.
    fn entry(&self, id: KeyId) -> Option<&KeyEntry> {
        let entry = self.page.entry(id);
        if entry.is_none() {
            warn!(id = %id, "Key is not on the page");
        }
        entry
    }

    fn is_stale(&self, generation: u64, id: KeyId) -> bool {
        let stale = generation != self.generation;
        if stale {
            debug!(
                id = %id,
                generation,
                current = self.generation,
                "Dropping result from a previous page"
            );
        }
        stale
    }

    fn refresh_rows(&mut self) {
        self.table
            .set_items(self.page.entries().map(KeyRow::from).collect());
        self.table
            .set_title(self.page.filter.label(&self.page.categories));
    }

    fn process_message(&mut self, msg: WalletMsg) -> UpdateResult {
        match msg {
            WalletMsg::Load => self.load(),
            WalletMsg::Loaded(listing) => {
                self.show_listing(listing);
                UpdateResult::Idle
            }
            WalletMsg::LoadFailed(err) => {
                self.loading = false;
                UpdateResult::Error(format!("Failed to load wallet: {err}"))
            }
            WalletMsg::StepFilter { forward } => {
                self.filter = self.filter.step(&self.page.categories, forward);
                debug!(filter = ?self.filter, "Changed category filter");
                self.load()
            }

            WalletMsg::ToggleVisibility(id) => self.toggle_visibility(id),
            WalletMsg::KeyRevealed {
                id,
                secret,
                generation,
            } => {
                if self.is_stale(generation, id) {
                    return UpdateResult::Idle;
                }
                match self.page.entry_mut(id) {
                    Some(entry) => entry.reveal(secret),
                    None => debug!(id = %id, "Revealed key is no longer on the page"),
                }
                self.refresh_rows();
                UpdateResult::Idle
            }

            WalletMsg::Copy(id) => self.copy(id),
            WalletMsg::KeyCopied { id, generation } => {
                if self.is_stale(generation, id) {
                    return UpdateResult::Idle;
                }
                self.flash_copied(id)
            }
            WalletMsg::CopyFlashExpired { id, generation } => {
                if !self.is_stale(generation, id) {
                    self.expire_flash(id);
                }
                UpdateResult::Idle
            }

            WalletMsg::OpenAdd => {
                let current = match self.filter {
                    CategoryFilter::Only(id) => id,
                    CategoryFilter::All => CategoryId::UNCATEGORIZED,
                };
                let dialog = AddDialog::new(current, &self.page.categories, self.resolver.clone());
                self.modal = Some(WalletModal::Add(dialog));
                UpdateResult::Idle
            }
            // Like the edit form, the add form stays open until the reload
            WalletMsg::SubmitAdd {
                key_name,
                api_key,
                category,
            } => AddKeyCmd {
                api: self.api.clone(),
                key_name,
                api_key,
                category,
                tx: self.msg_tx.clone(),
            }
            .into(),

            WalletMsg::OpenEdit(id) => {
                if let Some(entry) = self.entry(id) {
                    self.modal = Some(WalletModal::Edit(EditDialog::new(id, &entry.name)));
                }
                UpdateResult::Idle
            }
            // The form stays open until the reload replaces the page
            WalletMsg::SubmitEdit { id, key_name } => EditKeyCmd {
                api: self.api.clone(),
                id,
                key_name,
                tx: self.msg_tx.clone(),
            }
            .into(),
            WalletMsg::CancelAdd | WalletMsg::CancelEdit | WalletMsg::CancelCategorySelect => {
                self.modal = None;
                UpdateResult::Idle
            }

            WalletMsg::OpenDelete(id) => {
                if let Some(entry) = self.entry(id) {
                    let dialog = DeleteDialog::new(&entry.name, self.resolver.clone());
                    self.pending_delete = Some(id);
                    self.modal = Some(WalletModal::Delete(dialog));
                }
                UpdateResult::Idle
            }
            WalletMsg::ConfirmDelete => self.confirm_delete(),
            WalletMsg::CancelDelete => {
                self.modal = None;
                self.pending_delete = None;
                UpdateResult::Idle
            }
            WalletMsg::Deleted => {
                self.modal = None;
                self.load()
            }

            WalletMsg::OpenCategorySelect(id) => {
                if let Some(entry) = self.entry(id) {
                    let dialog = CategoryDialog::new(
                        id,
                        entry.selected_category(),
                        &self.page.categories,
                        self.resolver.clone(),
                    );
                    self.modal = Some(WalletModal::Category(dialog));
                }
                UpdateResult::Idle
            }
            WalletMsg::ChangeCategory { id, category_id } => self.change_category(id, category_id),

            WalletMsg::BackdropClicked => {
                if matches!(self.modal, Some(WalletModal::Delete(_))) {
                    self.pending_delete = None;
                }
                self.modal = None;
                UpdateResult::Idle
            }
        }
    }

    /// Drop everything the page shows and fetch it again.
    fn load(&mut self) -> UpdateResult {
        self.loading = true;
        self.modal = None;
        self.pending_delete = None;
        FetchWalletCmd {
            api: self.api.clone(),
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    fn show_listing(&mut self, listing: WalletListing) {
        self.loading = false;
        self.modal = None;
        self.pending_delete = None;
        self.copy_flashes.clear();
        self.generation += 1;
        self.page = WalletPage::build(listing, self.filter);
        debug!(keys = self.page.entries().count(), "Wallet loaded");
        self.refresh_rows();
    }

    fn toggle_visibility(&mut self, id: KeyId) -> UpdateResult {
        let Some(entry) = self.entry(id) else {
            return UpdateResult::Idle;
        };

        if entry.is_revealed() {
            if let Some(entry) = self.page.entry_mut(id) {
                entry.mask();
            }
            self.refresh_rows();
            return UpdateResult::Idle;
        }

        RevealKeyCmd {
            api: self.api.clone(),
            id,
            generation: self.generation,
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    fn copy(&self, id: KeyId) -> UpdateResult {
        if self.entry(id).is_none() {
            return UpdateResult::Idle;
        }
        CopyKeyCmd {
            api: self.api.clone(),
            clipboard: self.clipboard.clone(),
            id,
            generation: self.generation,
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    fn flash_copied(&mut self, id: KeyId) -> UpdateResult {
        let Some(entry) = self.page.entry_mut(id) else {
            debug!(id = %id, "Copied key is no longer on the page");
            return UpdateResult::Idle;
        };
        entry.copy_icon = CopyIcon::Check;
        *self.copy_flashes.entry(id).or_default() += 1;
        self.refresh_rows();

        CopyFlashCmd {
            id,
            generation: self.generation,
            duration: self.copy_flash,
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    /// Restore the copy icon once the last running timer of the key is done.
    fn expire_flash(&mut self, id: KeyId) {
        let remaining = self.copy_flashes.get_mut(&id).map_or(0, |running| {
            *running = running.saturating_sub(1);
            *running
        });
        if remaining > 0 {
            return;
        }
        self.copy_flashes.remove(&id);
        if let Some(entry) = self.page.entry_mut(id) {
            entry.copy_icon = CopyIcon::Copy;
        }
        self.refresh_rows();
    }

    fn confirm_delete(&self) -> UpdateResult {
        let Some(id) = self.pending_delete else {
            debug!("No key pending deletion");
            return UpdateResult::Idle;
        };
        DeleteKeyCmd {
            api: self.api.clone(),
            id,
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    fn change_category(&mut self, id: KeyId, category_id: CategoryId) -> UpdateResult {
        self.modal = None;
        if self.entry(id).is_none() {
            return UpdateResult::Idle;
        }
        UpdateCategoryCmd {
            api: self.api.clone(),
            id,
            category_id,
            tx: self.msg_tx.clone(),
        }
        .into()
    }

    fn handle_mouse(&self, mouse: &MouseEvent) -> bool {
        let Some(modal) = &self.modal else {
            return false;
        };
        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && modal.is_backdrop(Position::new(mouse.column, mouse.row))
        {
            self.queue(WalletMsg::BackdropClicked);
        }
        // The modal blocks the page below
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(modal) = &mut self.modal {
            match modal.handle_key(key) {
                Ok(Some(msg)) => self.queue(msg),
                Ok(None) => {}
                Err(err) => error!(error = %err, "Failed to handle key in dialog"),
            }
            return true;
        }

        if self.loading {
            return false;
        }

        if !self.table.is_searching() {
            if let Some(msg) = self.key_action(&key) {
                self.queue(msg);
                return true;
            }
        }

        match self.table.handle_key(key) {
            Ok(EventResult::Event(TableEvent::Activated(row))) => {
                self.queue(WalletMsg::ToggleVisibility(row.id));
                true
            }
            Ok(result) => result.is_consumed(),
            Err(err) => {
                error!(error = %err, "Failed to handle key in table");
                true
            }
        }
    }

    /// Map a wallet key binding to its message. Row actions need a selection.
    fn key_action(&self, key: &KeyEvent) -> Option<WalletMsg> {
        let matches = |action| self.resolver.matches_wallet(key, action);

        if matches(WalletAction::Reload) {
            return Some(WalletMsg::Load);
        }
        if matches(WalletAction::NextFilter) {
            return Some(WalletMsg::StepFilter { forward: true });
        }
        if matches(WalletAction::PreviousFilter) {
            return Some(WalletMsg::StepFilter { forward: false });
        }
        if matches(WalletAction::Add) {
            return Some(WalletMsg::OpenAdd);
        }

        let id = self.selected_key()?;
        if matches(WalletAction::ToggleVisibility) {
            Some(WalletMsg::ToggleVisibility(id))
        } else if matches(WalletAction::Copy) {
            Some(WalletMsg::Copy(id))
        } else if matches(WalletAction::Edit) {
            Some(WalletMsg::OpenEdit(id))
        } else if matches(WalletAction::Delete) {
            Some(WalletMsg::OpenDelete(id))
        } else if matches(WalletAction::Category) {
            Some(WalletMsg::OpenCategorySelect(id))
        } else {
            None
        }
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(format!(" {} ", self.page.filter.label(&self.page.categories)));
        let paragraph = Paragraph::new("No API keys in this wallet yet.")
            .style(Style::default().fg(theme.overlay1()))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
    }
}

impl Screen for Wallet {
    fn init(&mut self) {
        self.queue(WalletMsg::Load);
    }

    fn handle_tick(&mut self) {
        if self.loading {
            self.spinner.handle_tick();
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => false,
        }
    }

    fn update(&mut self) -> UpdateResult {
        let mut commands: Vec<Box<dyn Command>> = Vec::new();

        while let Ok(msg) = self.msg_rx.try_recv() {
            match self.process_message(msg) {
                UpdateResult::Idle => {}
                UpdateResult::Commands(cmds) => commands.extend(cmds),
                UpdateResult::Close => return UpdateResult::Close,
                UpdateResult::Error(e) => return UpdateResult::Error(e),
            }
        }

        if commands.is_empty() {
            UpdateResult::Idle
        } else {
            UpdateResult::Commands(commands)
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.loading {
            self.spinner.render(frame, area, theme);
        } else if self.page.is_empty() {
            self.render_empty(frame, area, theme);
        } else {
            self.table.render(frame, area, theme);
        }

        if let Some(modal) = &mut self.modal {
            modal.render(frame, area, theme);
        }
    }

    fn title(&self) -> String {
        format!("Wallet · {}", self.page.filter.label(&self.page.categories))
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        match &self.modal {
            Some(WalletModal::Add(_)) => vec![
                Keybinding::new("Enter", "Next"),
                Keybinding::new("Esc", "Cancel"),
            ],
            Some(WalletModal::Edit(_)) => vec![
                Keybinding::new("Enter", "Save"),
                Keybinding::new("Esc", "Cancel"),
            ],
            Some(WalletModal::Delete(_)) => vec![
                Keybinding::new(r.display_dialog(DialogAction::Confirm), "Delete"),
                Keybinding::new(r.display_dialog(DialogAction::Cancel), "Cancel"),
            ],
            Some(WalletModal::Category(_)) => vec![
                Keybinding::new(r.display_nav(NavAction::Select), "Move"),
                Keybinding::new(r.display_dialog(DialogAction::Cancel), "Cancel"),
            ],
            None if self.table.is_searching() => vec![
                Keybinding::new(r.display_nav(NavAction::Select), "Keep filter"),
                Keybinding::new(r.display_search(SearchAction::Exit), "Clear search"),
            ],
            None => vec![
                Keybinding::new(r.display_wallet(WalletAction::Add), "Add"),
                Keybinding::new(r.display_wallet(WalletAction::ToggleVisibility), "Show/Hide"),
                Keybinding::new(r.display_wallet(WalletAction::Copy), "Copy"),
                Keybinding::new(r.display_wallet(WalletAction::Edit), "Rename"),
                Keybinding::new(r.display_wallet(WalletAction::Delete), "Delete"),
                Keybinding::new(r.display_wallet(WalletAction::Category), "Category"),
                Keybinding::new(
                    format!(
                        "{}/{}",
                        r.display_wallet(WalletAction::PreviousFilter),
                        r.display_wallet(WalletAction::NextFilter)
                    ),
                    "Filter",
                ),
                Keybinding::new(r.display_wallet(WalletAction::Reload), "Reload"),
                Keybinding::new(r.display_search(SearchAction::Toggle), "Search"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::api::{
        AddKeyResponse, AddedKey, ApiError, ApiKey, Category, KeyResponse, SuccessResponse,
        UNCATEGORIZED_NAME,
    };
    use crate::wallet::dialog::AddStep;
    use crate::wallet::page::{MASKED_KEY, VisibilityIcon};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Request {
        List,
        AddKey(String, String, CategoryId),
        GetKey(KeyId),
        CopyKey(KeyId),
        EditKey(KeyId, String),
        DeleteKey(KeyId),
        UpdateCategory(KeyId, CategoryId),
    }

    /// In-memory server. `rejects` answers mutations with `{success: false}`,
    /// `offline` fails every request.
    #[derive(Default)]
    struct FakeApi {
        requests: Mutex<Vec<Request>>,
        secrets: HashMap<KeyId, String>,
        rejects: bool,
        offline: bool,
    }

    impl FakeApi {
        fn with_secrets() -> Self {
            Self {
                secrets: HashMap::from([
                    (KeyId(42), "sk_live_abcd".to_string()),
                    (KeyId(7), "sk-openai".to_string()),
                ]),
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        fn record(&self, request: Request) -> Result<(), ApiError> {
            self.requests.lock().unwrap().push(request);
            if self.offline {
                return Err(ApiError::Decode {
                    path: "/".to_string(),
                    source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
                });
            }
            Ok(())
        }

        fn key(&self, id: KeyId) -> KeyResponse {
            KeyResponse {
                key: self.secrets.get(&id).cloned(),
            }
        }

        const fn outcome(&self) -> SuccessResponse {
            SuccessResponse {
                success: !self.rejects,
            }
        }
    }

    #[async_trait]
    impl WalletApi for FakeApi {
        async fn list_keys(&self) -> Result<WalletListing, ApiError> {
            self.record(Request::List)?;
            Ok(listing())
        }

        async fn add_key(
            &self,
            key_name: &str,
            api_key: &str,
            category: CategoryId,
        ) -> Result<AddKeyResponse, ApiError> {
            self.record(Request::AddKey(
                key_name.to_string(),
                api_key.to_string(),
                category,
            ))?;
            Ok(AddKeyResponse {
                success: !self.rejects,
                key: (!self.rejects).then(|| AddedKey {
                    id: KeyId(100),
                    key_name: key_name.to_string(),
                    category_id: (!category.is_uncategorized()).then_some(category),
                    category_name: UNCATEGORIZED_NAME.to_string(),
                }),
            })
        }

        async fn get_key(&self, id: KeyId) -> Result<KeyResponse, ApiError> {
            self.record(Request::GetKey(id))?;
            Ok(self.key(id))
        }

        async fn copy_key(&self, id: KeyId) -> Result<KeyResponse, ApiError> {
            self.record(Request::CopyKey(id))?;
            Ok(self.key(id))
        }

        async fn edit_key(&self, id: KeyId, key_name: &str) -> Result<SuccessResponse, ApiError> {
            self.record(Request::EditKey(id, key_name.to_string()))?;
            Ok(self.outcome())
        }

        async fn delete_key(&self, id: KeyId) -> Result<SuccessResponse, ApiError> {
            self.record(Request::DeleteKey(id))?;
            Ok(self.outcome())
        }

        async fn update_key_category(
            &self,
            id: KeyId,
            category_id: CategoryId,
        ) -> Result<SuccessResponse, ApiError> {
            self.record(Request::UpdateCategory(id, category_id))?;
            Ok(self.outcome())
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Mutex<Vec<String>>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&self, text: String) -> color_eyre::Result<()> {
            self.copied.lock().unwrap().push(text);
            Ok(())
        }
    }

    fn api_key(id: u64, name: &str, category: Option<u64>) -> ApiKey {
        ApiKey {
            id: KeyId(id),
            key_name: name.to_string(),
            category_id: category.map(CategoryId),
            date_added: NaiveDate::from_ymd_opt(2025, 4, 16)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    /// Rows in page order: OpenAI (7), Stripe (42), Mailgun (9).
    fn listing() -> WalletListing {
        WalletListing {
            categories: vec![
                Category {
                    id: CategoryId(2),
                    name: "Payments".to_string(),
                },
                Category {
                    id: CategoryId(5),
                    name: "AI".to_string(),
                },
            ],
            grouped_keys: HashMap::from([
                ("Payments".to_string(), vec![api_key(42, "Stripe", Some(2))]),
                ("AI".to_string(), vec![api_key(7, "OpenAI", Some(5))]),
                (
                    UNCATEGORIZED_NAME.to_string(),
                    vec![api_key(9, "Mailgun", None)],
                ),
            ]),
        }
    }

    struct Harness {
        wallet: Wallet,
        api: Arc<FakeApi>,
        clipboard: Arc<RecordingClipboard>,
    }

    impl Harness {
        async fn start(api: FakeApi) -> Self {
            let mut harness = Self::new(api);
            harness.settle().await;
            harness
        }

        /// A wallet whose initial load is queued but not run yet.
        fn new(api: FakeApi) -> Self {
            let api = Arc::new(api);
            let clipboard = Arc::new(RecordingClipboard::default());
            let mut wallet = Wallet::new(
                api.clone(),
                clipboard.clone(),
                Arc::new(KeyResolver::default()),
                CategoryFilter::All,
            );
            wallet.init();
            Self {
                wallet,
                api,
                clipboard,
            }
        }

        /// Run `update()` and the commands it returns until nothing is left.
        /// Returns the reported errors.
        async fn settle(&mut self) -> Vec<String> {
            let mut errors = Vec::new();
            for _ in 0..8 {
                match self.wallet.update() {
                    UpdateResult::Commands(cmds) => {
                        for cmd in cmds {
                            tokio::spawn(cmd.execute());
                        }
                    }
                    UpdateResult::Error(err) => errors.push(err),
                    UpdateResult::Idle | UpdateResult::Close => {}
                }
                tokio::task::yield_now().await;
            }
            errors
        }

        async fn press(&mut self, code: KeyCode) {
            self.press_with(code, KeyModifiers::NONE).await;
        }

        async fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) {
            self.wallet
                .handle_input(&Event::Key(KeyEvent::new(code, modifiers)));
            self.settle().await;
        }

        async fn send(&mut self, msg: WalletMsg) {
            self.wallet.queue(msg);
            self.settle().await;
        }

        async fn click(&mut self, column: u16, row: u16) {
            self.wallet.handle_input(&Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            }));
            self.settle().await;
        }

        fn draw(&mut self) {
            let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
            terminal
                .draw(|frame| self.wallet.view(frame, frame.area(), &Theme::default()))
                .unwrap();
        }

        fn entry(&self, id: u64) -> &KeyEntry {
            self.wallet.page.entry(KeyId(id)).unwrap()
        }

        fn requests_after_load(&self) -> Vec<Request> {
            self.api.requests().into_iter().skip(1).collect()
        }
    }

    #[tokio::test]
    async fn load_shows_every_key_masked() {
        let h = Harness::start(FakeApi::with_secrets()).await;

        assert_eq!(h.api.requests(), vec![Request::List]);
        assert_eq!(h.wallet.page.entries().count(), 3);
        assert!(h.wallet.page.entries().all(|e| e.display() == MASKED_KEY));
        assert_eq!(h.wallet.title(), "Wallet · All keys");
    }

    #[tokio::test]
    async fn toggling_reveals_the_secret_from_the_server() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.send(WalletMsg::ToggleVisibility(KeyId(42))).await;

        assert_eq!(h.requests_after_load(), vec![Request::GetKey(KeyId(42))]);
        assert_eq!(h.entry(42).display(), "sk_live_abcd");
        assert_eq!(h.entry(42).visibility_icon, VisibilityIcon::EyeSlash);
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_placeholder_without_a_second_request() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('v')).await;
        assert_eq!(h.entry(7).display(), "sk-openai");

        h.press(KeyCode::Char('v')).await;
        assert_eq!(h.entry(7).display(), MASKED_KEY);
        assert_eq!(h.entry(7).visibility_icon, VisibilityIcon::Eye);
        assert_eq!(h.requests_after_load(), vec![Request::GetKey(KeyId(7))]);
    }

    #[tokio::test]
    async fn enter_on_a_row_toggles_visibility() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('j')).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(h.entry(42).display(), "sk_live_abcd");
    }

    #[tokio::test]
    async fn missing_key_in_response_leaves_the_key_masked() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.send(WalletMsg::ToggleVisibility(KeyId(9))).await;

        assert_eq!(h.requests_after_load(), vec![Request::GetKey(KeyId(9))]);
        assert_eq!(h.entry(9).display(), MASKED_KEY);
    }

    #[tokio::test]
    async fn interaction_failures_are_silent() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;
        let offline = Arc::new(FakeApi {
            offline: true,
            ..FakeApi::with_secrets()
        });
        h.wallet.api = offline.clone() as Arc<dyn WalletApi>;

        h.wallet.queue(WalletMsg::ToggleVisibility(KeyId(42)));
        h.wallet.queue(WalletMsg::Copy(KeyId(42)));
        let errors = h.settle().await;

        assert!(errors.is_empty());
        assert_eq!(offline.requests().len(), 2);
        assert_eq!(h.entry(42).display(), MASKED_KEY);
        assert_eq!(h.entry(42).copy_icon, CopyIcon::Copy);
        assert!(h.clipboard.copied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_key_sends_nothing() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.send(WalletMsg::ToggleVisibility(KeyId(999))).await;
        h.send(WalletMsg::Copy(KeyId(999))).await;
        h.send(WalletMsg::OpenEdit(KeyId(999))).await;

        assert!(h.requests_after_load().is_empty());
        assert!(h.wallet.modal.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn copy_writes_the_clipboard_and_flashes_for_a_second() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('y')).await;
        assert_eq!(h.requests_after_load(), vec![Request::CopyKey(KeyId(7))]);
        assert_eq!(*h.clipboard.copied.lock().unwrap(), vec!["sk-openai"]);
        assert_eq!(h.entry(7).copy_icon, CopyIcon::Check);

        tokio::time::sleep(Duration::from_millis(999)).await;
        h.settle().await;
        assert_eq!(h.entry(7).copy_icon, CopyIcon::Check);

        tokio::time::sleep(Duration::from_millis(2)).await;
        h.settle().await;
        assert_eq!(h.entry(7).copy_icon, CopyIcon::Copy);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_copies_restore_the_icon_after_the_last_one() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.send(WalletMsg::Copy(KeyId(42))).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.send(WalletMsg::Copy(KeyId(42))).await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        h.settle().await;
        assert_eq!(h.entry(42).copy_icon, CopyIcon::Check);

        tokio::time::sleep(Duration::from_millis(401)).await;
        h.settle().await;
        assert_eq!(h.entry(42).copy_icon, CopyIcon::Copy);
        assert_eq!(h.clipboard.copied.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_drops_copy_feedback_timers_of_the_previous_page() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.send(WalletMsg::Copy(KeyId(42))).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.send(WalletMsg::Load).await;
        assert_eq!(h.entry(42).copy_icon, CopyIcon::Copy);

        tokio::time::sleep(Duration::from_millis(400)).await;
        h.send(WalletMsg::Copy(KeyId(42))).await;

        // The first timer ends here; it belongs to the old page
        tokio::time::sleep(Duration::from_millis(600)).await;
        h.settle().await;
        assert_eq!(h.entry(42).copy_icon, CopyIcon::Check);

        tokio::time::sleep(Duration::from_millis(401)).await;
        h.settle().await;
        assert_eq!(h.entry(42).copy_icon, CopyIcon::Copy);
    }

    #[tokio::test]
    async fn secret_arriving_after_a_reload_stays_hidden() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;
        let before_reload = h.wallet.generation;

        h.wallet.queue(WalletMsg::Loaded(listing()));
        h.wallet.queue(WalletMsg::KeyRevealed {
            id: KeyId(42),
            secret: "sk_live_abcd".to_string(),
            generation: before_reload,
        });
        h.settle().await;

        assert_eq!(h.entry(42).display(), MASKED_KEY);
        assert_eq!(h.entry(42).visibility_icon, VisibilityIcon::Eye);
    }

    #[tokio::test]
    async fn copy_confirmed_after_a_reload_does_not_flash() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;
        let before_reload = h.wallet.generation;

        h.wallet.queue(WalletMsg::Loaded(listing()));
        h.wallet.queue(WalletMsg::KeyCopied {
            id: KeyId(42),
            generation: before_reload,
        });
        h.settle().await;

        assert_eq!(h.entry(42).copy_icon, CopyIcon::Copy);
        assert!(h.wallet.copy_flashes.is_empty());
    }

    async fn type_text(h: &mut Harness, text: &str) {
        for c in text.chars() {
            h.press(KeyCode::Char(c)).await;
        }
    }

    #[tokio::test]
    async fn adding_a_key_sends_name_secret_and_category_then_reloads() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('a')).await;
        type_text(&mut h, "Twilio").await;
        h.press(KeyCode::Enter).await;
        type_text(&mut h, "tw_secret").await;
        h.press(KeyCode::Enter).await;
        let Some(WalletModal::Add(dialog)) = &h.wallet.modal else {
            panic!("add dialog not open");
        };
        assert_eq!(dialog.step(), AddStep::Category);

        // Uncategorized (preselected), AI, Payments
        h.press(KeyCode::Char('j')).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(
            h.requests_after_load(),
            vec![
                Request::AddKey(
                    "Twilio".to_string(),
                    "tw_secret".to_string(),
                    CategoryId(5)
                ),
                Request::List
            ]
        );
        assert!(h.wallet.modal.is_none());
    }

    #[tokio::test]
    async fn add_form_needs_a_name_and_a_secret() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('a')).await;
        h.press(KeyCode::Enter).await;
        type_text(&mut h, "  ").await;
        h.press(KeyCode::Enter).await;
        let Some(WalletModal::Add(dialog)) = &h.wallet.modal else {
            panic!("add dialog not open");
        };
        assert_eq!(dialog.step(), AddStep::Name);

        type_text(&mut h, "Twilio").await;
        h.press(KeyCode::Enter).await;
        h.press(KeyCode::Enter).await;
        let Some(WalletModal::Add(dialog)) = &h.wallet.modal else {
            panic!("add dialog not open");
        };
        assert_eq!(dialog.step(), AddStep::Secret);

        h.press(KeyCode::Esc).await;
        assert!(h.wallet.modal.is_none());
        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn add_form_preselects_the_filtered_category_and_stays_open_when_rejected() {
        let mut h = Harness::start(FakeApi {
            rejects: true,
            ..FakeApi::with_secrets()
        })
        .await;

        h.press(KeyCode::Char(']')).await;
        h.press(KeyCode::Char('a')).await;
        type_text(&mut h, "Anthropic").await;
        h.press(KeyCode::Enter).await;
        type_text(&mut h, "sk-ant").await;
        h.press(KeyCode::Enter).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(
            h.requests_after_load(),
            vec![
                Request::List,
                Request::AddKey("Anthropic".to_string(), "sk-ant".to_string(), CategoryId(5))
            ]
        );
        assert!(matches!(h.wallet.modal, Some(WalletModal::Add(_))));
    }

    #[tokio::test]
    async fn edit_prefills_the_current_name_and_reloads_on_success() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('j')).await;
        h.press(KeyCode::Char('e')).await;
        let Some(WalletModal::Edit(dialog)) = &h.wallet.modal else {
            panic!("edit dialog not open");
        };
        assert_eq!(dialog.key_id(), KeyId(42));
        assert_eq!(dialog.key_name(), "Stripe");

        h.press_with(KeyCode::Char('u'), KeyModifiers::CONTROL).await;
        for c in "Stripe live".chars() {
            h.press(KeyCode::Char(c)).await;
        }
        h.press(KeyCode::Enter).await;

        assert_eq!(
            h.requests_after_load(),
            vec![
                Request::EditKey(KeyId(42), "Stripe live".to_string()),
                Request::List
            ]
        );
        assert!(h.wallet.modal.is_none());
    }

    #[tokio::test]
    async fn rejected_edit_keeps_the_form_open() {
        let mut h = Harness::start(FakeApi {
            rejects: true,
            ..FakeApi::with_secrets()
        })
        .await;

        h.press(KeyCode::Char('e')).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(
            h.requests_after_load(),
            vec![Request::EditKey(KeyId(7), "OpenAI".to_string())]
        );
        assert!(matches!(h.wallet.modal, Some(WalletModal::Edit(_))));
    }

    #[tokio::test]
    async fn cancel_edit_hides_the_form() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('e')).await;
        h.press(KeyCode::Esc).await;

        assert!(h.wallet.modal.is_none());
        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_reloads_and_clears_the_target() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('d')).await;
        assert_eq!(h.wallet.pending_delete, Some(KeyId(7)));
        assert!(matches!(h.wallet.modal, Some(WalletModal::Delete(_))));

        h.press(KeyCode::Char('y')).await;

        assert_eq!(
            h.requests_after_load(),
            vec![Request::DeleteKey(KeyId(7)), Request::List]
        );
        assert!(h.wallet.modal.is_none());
        assert_eq!(h.wallet.pending_delete, None);
    }

    #[tokio::test]
    async fn confirm_delete_without_target_sends_nothing() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.send(WalletMsg::ConfirmDelete).await;

        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn cancel_delete_clears_the_target() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('d')).await;
        h.press(KeyCode::Char('n')).await;

        assert!(h.wallet.modal.is_none());
        assert_eq!(h.wallet.pending_delete, None);

        h.send(WalletMsg::ConfirmDelete).await;
        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_confirmation_open() {
        let mut h = Harness::start(FakeApi {
            rejects: true,
            ..FakeApi::with_secrets()
        })
        .await;

        h.press(KeyCode::Char('d')).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(h.requests_after_load(), vec![Request::DeleteKey(KeyId(7))]);
        assert!(matches!(h.wallet.modal, Some(WalletModal::Delete(_))));
        assert_eq!(h.wallet.pending_delete, Some(KeyId(7)));
    }

    #[tokio::test]
    async fn clicking_the_backdrop_hides_the_modal_but_clicking_inside_does_not() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('d')).await;
        h.draw();

        h.click(40, 12).await;
        assert!(matches!(h.wallet.modal, Some(WalletModal::Delete(_))));
        assert_eq!(h.wallet.pending_delete, Some(KeyId(7)));

        h.click(0, 0).await;
        assert!(h.wallet.modal.is_none());
        assert_eq!(h.wallet.pending_delete, None);
        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn click_before_the_modal_is_drawn_is_ignored() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('d')).await;
        h.click(0, 0).await;

        assert!(matches!(h.wallet.modal, Some(WalletModal::Delete(_))));
        assert_eq!(h.wallet.pending_delete, Some(KeyId(7)));
    }

    #[tokio::test]
    async fn clicking_the_backdrop_hides_the_edit_form() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('e')).await;
        h.draw();
        h.click(79, 23).await;

        assert!(h.wallet.modal.is_none());
    }

    #[tokio::test]
    async fn changing_category_sends_the_new_id_and_reloads() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        // Uncategorized, AI (current), Payments
        h.press(KeyCode::Char('c')).await;
        h.press(KeyCode::Char('j')).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(
            h.requests_after_load(),
            vec![
                Request::UpdateCategory(KeyId(7), CategoryId(2)),
                Request::List
            ]
        );
        assert!(h.wallet.modal.is_none());
    }

    #[tokio::test]
    async fn moving_to_uncategorized_sends_zero() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('c')).await;
        h.press(KeyCode::Char('g')).await;
        h.press(KeyCode::Enter).await;

        assert_eq!(
            h.requests_after_load()[0],
            Request::UpdateCategory(KeyId(7), CategoryId::UNCATEGORIZED)
        );
    }

    #[tokio::test]
    async fn reselecting_the_current_category_sends_nothing() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('c')).await;
        h.press(KeyCode::Enter).await;

        assert!(h.wallet.modal.is_none());
        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn reload_masks_every_key_again() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('v')).await;
        assert_eq!(h.entry(7).display(), "sk-openai");

        h.press(KeyCode::Char('r')).await;

        assert_eq!(h.entry(7).display(), MASKED_KEY);
        assert_eq!(
            h.requests_after_load(),
            vec![Request::GetKey(KeyId(7)), Request::List]
        );
    }

    #[tokio::test]
    async fn stepping_the_filter_reloads_one_category() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char(']')).await;

        assert_eq!(h.wallet.filter, CategoryFilter::Only(CategoryId(5)));
        assert_eq!(h.wallet.title(), "Wallet · AI");
        let ids: Vec<KeyId> = h.wallet.page.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![KeyId(7)]);

        h.press(KeyCode::Char('[')).await;
        assert_eq!(h.wallet.filter, CategoryFilter::All);
        assert_eq!(h.wallet.page.entries().count(), 3);
    }

    #[tokio::test]
    async fn search_swallows_action_keys() {
        let mut h = Harness::start(FakeApi::with_secrets()).await;

        h.press(KeyCode::Char('/')).await;
        h.press(KeyCode::Char('y')).await;

        assert!(h.requests_after_load().is_empty());
    }

    #[tokio::test]
    async fn load_failure_is_reported() {
        let mut h = Harness::new(FakeApi {
            offline: true,
            ..FakeApi::default()
        });

        let errors = h.settle().await;

        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to load wallet"));
        assert!(!h.wallet.loading);
        assert!(h.wallet.page.is_empty());
    }
}
