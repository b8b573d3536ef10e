use serde::{Deserialize, Serialize};

use super::{ActivityEngine, SessionHost};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Space,
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            meta: false,
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: true,
        }
    }

    /// Parses `ctrl+space`, `cmd+enter` and friends.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_ascii_lowercase();
        let (modifier, key) = lowered.split_once('+')?;
        let key = match key {
            "space" | " " => Key::Space,
            "enter" | "return" => Key::Enter,
            _ => Key::Other,
        };
        match modifier {
            "ctrl" | "control" => Some(Self::ctrl(key)),
            "cmd" | "meta" | "super" => Some(Self::meta(key)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutAction {
    Start,
    Pause,
    Resume,
    Complete,
}

/// What a key press would do right now, if anything.
pub fn resolve(
    engine: &ActivityEngine,
    host: &dyn SessionHost,
    press: KeyPress,
) -> Option<ShortcutAction> {
    if !(press.ctrl || press.meta) {
        return None;
    }

    let has_current = engine.current_activity_id().is_some();
    let has_selection = engine.effective_selection(host.session()).is_some();

    match press.key {
        Key::Space => {
            if engine.is_active() {
                Some(ShortcutAction::Pause)
            } else if has_current {
                Some(ShortcutAction::Resume)
            } else if has_selection {
                Some(ShortcutAction::Start)
            } else {
                None
            }
        }
        Key::Enter => {
            if has_current && engine.is_active() {
                Some(ShortcutAction::Complete)
            } else if has_selection {
                Some(ShortcutAction::Start)
            } else {
                None
            }
        }
        Key::Other => None,
    }
}

/// Resolves the press and runs the matching engine operation.
pub fn dispatch(
    engine: &mut ActivityEngine,
    host: &mut dyn SessionHost,
    press: KeyPress,
) -> Option<ShortcutAction> {
    let action = resolve(engine, host, press)?;
    match action {
        ShortcutAction::Start => engine.start(host),
        ShortcutAction::Pause => engine.pause(host),
        ShortcutAction::Resume => engine.resume(host),
        ShortcutAction::Complete => engine.complete(host),
    }
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modified_keys() {
        assert_eq!(KeyPress::parse("ctrl+space"), Some(KeyPress::ctrl(Key::Space)));
        assert_eq!(KeyPress::parse("Cmd+Enter"), Some(KeyPress::meta(Key::Enter)));
        assert_eq!(KeyPress::parse("ctrl+x"), Some(KeyPress::ctrl(Key::Other)));
        assert_eq!(KeyPress::parse("space"), None);
        assert_eq!(KeyPress::parse("alt+space"), None);
    }
}
