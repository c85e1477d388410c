use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DialogAction, FaqAction, GlobalAction, NavAction, SearchAction, WalletAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to the actions of each scope.
pub struct KeyResolver {
    keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Faq => &kb.faq,
            GlobalAction::Theme => &kb.theme,
            GlobalAction::Back => &kb.back,
        }
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    fn search(&self, action: SearchAction) -> &KeyBinding {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => &kb.toggle,
            SearchAction::Exit => &kb.exit,
        }
    }

    fn wallet(&self, action: WalletAction) -> &KeyBinding {
        let kb = &self.keybindings.wallet;
        match action {
            WalletAction::Add => &kb.add,
            WalletAction::ToggleVisibility => &kb.toggle_visibility,
            WalletAction::Copy => &kb.copy,
            WalletAction::Edit => &kb.edit,
            WalletAction::Delete => &kb.delete,
            WalletAction::Category => &kb.category,
            WalletAction::Reload => &kb.reload,
            WalletAction::NextFilter => &kb.next_filter,
            WalletAction::PreviousFilter => &kb.previous_filter,
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => &kb.confirm,
            DialogAction::Cancel => &kb.cancel,
            DialogAction::Dismiss => &kb.dismiss,
        }
    }

    fn faq(&self, action: FaqAction) -> &KeyBinding {
        match action {
            FaqAction::Toggle => &self.keybindings.faq.toggle,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).display()
    }

    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        self.search(action).matches(event)
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        self.search(action).display()
    }

    pub fn matches_wallet(&self, event: &KeyEvent, action: WalletAction) -> bool {
        self.wallet(action).matches(event)
    }

    pub fn display_wallet(&self, action: WalletAction) -> String {
        self.wallet(action).display()
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }

    pub fn matches_faq(&self, event: &KeyEvent, action: FaqAction) -> bool {
        self.faq(action).matches(event)
    }

    pub fn display_faq(&self, action: FaqAction) -> String {
        self.faq(action).display()
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
