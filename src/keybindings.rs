use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;
use tracing::warn;

use crate::config::KeyBindings;

/// Maps key combinations to tab-level actions
#[derive(Debug, Clone)]
pub struct KeybindingManager {
    bindings: HashMap<KeyBinding, Action>,
}

/// Key binding definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub modifiers: Vec<String>,
}

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewTab,
    CloseTab,
    NextTab,
    PrevTab,
    RenameTab,
    Clear,
}

impl KeybindingManager {
    /// Create new keybinding manager with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&KeyBindings::default())
    }

    /// Build bindings from configuration strings like "Ctrl+T" or "F2".
    /// Invalid entries are logged and skipped.
    #[must_use]
    pub fn from_config(config: &KeyBindings) -> Self {
        let mut manager = Self {
            bindings: HashMap::new(),
        };

        let entries = [
            (&config.new_tab, Action::NewTab),
            (&config.close_tab, Action::CloseTab),
            (&config.next_tab, Action::NextTab),
            (&config.prev_tab, Action::PrevTab),
            (&config.rename_tab, Action::RenameTab),
            (&config.clear, Action::Clear),
        ];
        for (combo, action) in entries {
            if let Err(e) = manager.add_binding_from_string(combo, action) {
                warn!("Ignoring keybinding '{}' for {:?}: {}", combo, action, e);
            }
        }

        manager
    }

    /// Add a keybinding
    pub fn add_binding(&mut self, key: &str, modifiers: &[&str], action: Action) {
        let binding = KeyBinding {
            key: key.to_string(),
            modifiers: modifiers
                .iter()
                .map(std::string::ToString::to_string)
                .collect(),
        };
        self.bindings.insert(binding, action);
    }

    /// Parse and add a keybinding from a config string like "Ctrl+T" or "Alt+Right"
    ///
    /// # Errors
    /// Returns an error if the combination string is empty or has no key
    pub fn add_binding_from_string(&mut self, combo: &str, action: Action) -> Result<(), String> {
        if combo.trim().is_empty() {
            return Err("Empty key combination".to_string());
        }

        let parts: Vec<&str> = combo.split('+').map(str::trim).collect();

        // Last part is the key, everything before is modifiers
        let key = match parts.last() {
            Some(k) if !k.is_empty() => *k,
            _ => return Err("Invalid key combination format".to_string()),
        };

        // Keep Ctrl, Shift, Alt order to match get_action
        let mut normalized_mods: Vec<&str> = Vec::new();
        for wanted in ["Ctrl", "Shift", "Alt"] {
            let present = parts[..parts.len() - 1].iter().any(|m| {
                matches!(
                    (wanted, m.to_lowercase().as_str()),
                    ("Ctrl", "ctrl" | "control") | ("Shift", "shift") | ("Alt", "alt")
                )
            });
            if present {
                normalized_mods.push(wanted);
            }
        }

        let normalized_key = normalize_key(key);
        self.add_binding(&normalized_key, &normalized_mods, action);
        Ok(())
    }

    /// Get action for key event
    ///
    /// Character keys are matched lowercase so Ctrl+Shift+T still finds a
    /// binding written as ctrl+shift+t.
    #[must_use]
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        let key_str = match code {
            KeyCode::Char(c) => c.to_lowercase().to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            _ => return None,
        };

        let mut mod_vec = Vec::new();
        if modifiers.contains(KeyModifiers::CONTROL) {
            mod_vec.push("Ctrl".to_string());
        }
        if modifiers.contains(KeyModifiers::SHIFT) {
            mod_vec.push("Shift".to_string());
        }
        if modifiers.contains(KeyModifiers::ALT) {
            mod_vec.push("Alt".to_string());
        }

        let binding = KeyBinding {
            key: key_str,
            modifiers: mod_vec,
        };

        self.bindings.get(&binding).copied()
    }
}

fn normalize_key(key: &str) -> String {
    let key_lower = key.to_lowercase();
    match key_lower.as_str() {
        "tab" => "Tab".to_string(),
        "enter" | "return" => "Enter".to_string(),
        "esc" | "escape" => "Esc".to_string(),
        "up" => "Up".to_string(),
        "down" => "Down".to_string(),
        "left" => "Left".to_string(),
        "right" => "Right".to_string(),
        "pageup" | "pgup" => "PageUp".to_string(),
        "pagedown" | "pgdn" => "PageDown".to_string(),
        "space" => " ".to_string(),
        k if k.len() > 1 && k.starts_with('f') && k[1..].parse::<u8>().is_ok() => {
            format!("F{}", &k[1..])
        }
        k => k.to_string(),
    }
}

impl Default for KeybindingManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let manager = KeybindingManager::new();

        assert_eq!(
            manager.get_action(KeyCode::Char('t'), KeyModifiers::CONTROL),
            Some(Action::NewTab)
        );
        assert_eq!(
            manager.get_action(KeyCode::Char('w'), KeyModifiers::CONTROL),
            Some(Action::CloseTab)
        );
        assert_eq!(
            manager.get_action(KeyCode::Right, KeyModifiers::ALT),
            Some(Action::NextTab)
        );
        assert_eq!(
            manager.get_action(KeyCode::F(2), KeyModifiers::NONE),
            Some(Action::RenameTab)
        );
        assert_eq!(manager.get_action(KeyCode::Char('t'), KeyModifiers::NONE), None);
    }

    #[test]
    fn test_binding_from_string_normalizes() {
        let mut manager = KeybindingManager {
            bindings: HashMap::new(),
        };
        manager
            .add_binding_from_string("shift + CTRL + N", Action::NewTab)
            .unwrap();

        assert_eq!(
            manager.get_action(
                KeyCode::Char('N'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            ),
            Some(Action::NewTab)
        );
        assert!(manager.add_binding_from_string("", Action::Clear).is_err());
        assert!(manager.add_binding_from_string("Ctrl+", Action::Clear).is_err());
    }

    #[test]
    fn test_custom_config_bindings() {
        let config = KeyBindings {
            next_tab: "Ctrl+PageDown".to_string(),
            ..KeyBindings::default()
        };
        let manager = KeybindingManager::from_config(&config);
        assert_eq!(
            manager.get_action(KeyCode::PageDown, KeyModifiers::CONTROL),
            Some(Action::NextTab)
        );
        assert_eq!(manager.get_action(KeyCode::Right, KeyModifiers::ALT), None);
    }
}
