use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub faq: KeyBinding,
    pub theme: KeyBinding,
    pub back: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletKeybindings {
    pub add: KeyBinding,
    pub toggle_visibility: KeyBinding,
    pub copy: KeyBinding,
    pub edit: KeyBinding,
    pub delete: KeyBinding,
    pub category: KeyBinding,
    pub reload: KeyBinding,
    pub next_filter: KeyBinding,
    pub previous_filter: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqKeybindings {
    pub toggle: KeyBinding,
}

/// All keybindings, grouped by the scope they are active in.
///
/// Every scope falls back to its defaults, so a config file only needs to
/// list the bindings it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub wallet: WalletKeybindings,
    pub dialog: DialogKeybindings,
    pub faq: FaqKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
            faq: Key::char('F').into(),
            theme: Key::char('t').into(),
            back: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: vec![Key::char('k'), Key::new(KeyCode::Up)].into(),
            down: vec![Key::char('j'), Key::new(KeyCode::Down)].into(),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: vec![Key::char('g'), Key::new(KeyCode::Home)].into(),
            end: vec![Key::char('G'), Key::new(KeyCode::End)].into(),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::char('/').into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for WalletKeybindings {
    fn default() -> Self {
        Self {
            add: Key::char('a').into(),
            toggle_visibility: Key::char('v').into(),
            copy: Key::char('y').into(),
            edit: Key::char('e').into(),
            delete: vec![Key::char('d'), Key::new(KeyCode::Delete)].into(),
            category: Key::char('c').into(),
            reload: Key::char('r').into(),
            next_filter: Key::char(']').into(),
            previous_filter: Key::char('[').into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: vec![Key::char('y'), Key::char('Y'), Key::new(KeyCode::Enter)].into(),
            cancel: vec![Key::char('n'), Key::char('N'), Key::new(KeyCode::Esc)].into(),
            dismiss: vec![Key::new(KeyCode::Enter), Key::new(KeyCode::Esc), Key::char('q')].into(),
        }
    }
}

impl Default for FaqKeybindings {
    fn default() -> Self {
        Self {
            toggle: vec![Key::char(' '), Key::new(KeyCode::Enter)].into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: KeybindingsConfig = toml::from_str(
            r#"
            [wallet]
            copy = "ctrl+y"
            delete = ["x", "Delete"]
            "#,
        )
        .unwrap();

        assert_eq!(config.wallet.copy.display(), "ctrl+y");
        assert_eq!(config.wallet.delete.display(), "x/Delete");
        assert_eq!(config.wallet.edit.display(), "e");
        assert_eq!(config.global.quit.display(), "q");
    }
}
