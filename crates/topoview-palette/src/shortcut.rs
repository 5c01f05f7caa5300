use serde::{Deserialize, Serialize};

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyShortcut {
    pub key: String,
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyShortcut {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    KeyUp,
    #[default]
    KeyDown,
    KeyPress,
}

/// A keyboard event as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub kind: KeyEventKind,
    pub key: String,
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    /// The event was aimed at a text input element.
    pub target_is_input: bool,
}

impl KeyPress {
    pub fn down(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

/// Decides whether a key event opens the palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutTrigger {
    /// `None` triggers on every key event.
    pub shortcut: Option<KeyShortcut>,
    pub ignore_input_element: bool,
    pub key_event: KeyEventKind,
}

impl Default for ShortcutTrigger {
    fn default() -> Self {
        Self {
            shortcut: None,
            ignore_input_element: true,
            key_event: KeyEventKind::KeyDown,
        }
    }
}

impl ShortcutTrigger {
    pub fn new(shortcut: KeyShortcut) -> Self {
        Self {
            shortcut: Some(shortcut),
            ..Self::default()
        }
    }

    pub fn should_trigger(&self, press: &KeyPress) -> bool {
        if press.kind != self.key_event {
            return false;
        }
        if self.ignore_input_element && press.target_is_input {
            return false;
        }
        let Some(shortcut) = &self.shortcut else {
            return true;
        };
        // Each modifier must be down exactly when the shortcut asks for it.
        press.key.to_lowercase() == shortcut.key.to_lowercase()
            && press.alt == shortcut.alt
            && press.shift == shortcut.shift
            && press.ctrl == shortcut.ctrl
            && press.meta == shortcut.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_shortcut_triggers_on_anything() {
        let trigger = ShortcutTrigger::default();
        assert!(trigger.should_trigger(&KeyPress::down("x")));
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let trigger = ShortcutTrigger::new(KeyShortcut::new("K").ctrl());
        let press = KeyPress {
            ctrl: true,
            ..KeyPress::down("k")
        };
        assert!(trigger.should_trigger(&press));
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let trigger = ShortcutTrigger::new(KeyShortcut::new("p").ctrl().shift());
        let exact = KeyPress {
            ctrl: true,
            shift: true,
            ..KeyPress::down("p")
        };
        assert!(trigger.should_trigger(&exact));

        let missing_shift = KeyPress {
            ctrl: true,
            ..KeyPress::down("p")
        };
        assert!(!trigger.should_trigger(&missing_shift));

        let extra_alt = KeyPress {
            alt: true,
            ..exact.clone()
        };
        assert!(!trigger.should_trigger(&extra_alt));
    }

    #[test]
    fn test_input_elements() {
        let press = KeyPress {
            target_is_input: true,
            ..KeyPress::down("p")
        };
        let trigger = ShortcutTrigger::new(KeyShortcut::new("p"));
        assert!(!trigger.should_trigger(&press));

        let trigger = ShortcutTrigger {
            ignore_input_element: false,
            ..trigger
        };
        assert!(trigger.should_trigger(&press));
    }

    #[test]
    fn test_event_kind_must_match() {
        let trigger = ShortcutTrigger::new(KeyShortcut::new("p"));
        let press = KeyPress {
            kind: KeyEventKind::KeyUp,
            ..KeyPress::down("p")
        };
        assert!(!trigger.should_trigger(&press));
    }

    #[test]
    fn test_shortcut_from_json() {
        let trigger: ShortcutTrigger =
            serde_json::from_str(r#"{ "shortcut": { "key": "k", "meta": true } }"#).unwrap();
        assert!(trigger.ignore_input_element);
        assert_eq!(trigger.shortcut, Some(KeyShortcut::new("k").meta()));
    }
}
