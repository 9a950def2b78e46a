#![forbid(unsafe_code)]

//! Keyboard navigation policy.
//!
//! Maps key events to tour commands:
//!
//! | Key   | Command               | Disable name |
//! |-------|-----------------------|--------------|
//! | Esc   | [`NavCommand::Close`]    | `esc`        |
//! | Right | [`NavCommand::Next`]     | `right`      |
//! | Left  | [`NavCommand::Previous`] | `left`       |
//!
//! Keys can be disabled all at once or individually. In configuration
//! files the setting is either a boolean (`true` disables every key) or a
//! list of names such as `["esc", "left"]`.

use bitflags::bitflags;

use crate::event::{KeyCode, KeyEvent, KeyEventKind};

bitflags! {
    /// Set of navigation keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NavKeys: u8 {
        /// Escape closes the tour.
        const ESC   = 0b001;
        /// Left arrow goes to the previous step.
        const LEFT  = 0b010;
        /// Right arrow goes to the next step.
        const RIGHT = 0b100;
    }
}

impl NavKeys {
    /// Parse a single key name (`esc`, `left`, `right`).
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "esc" | "escape" => Some(Self::ESC),
            "left" => Some(Self::LEFT),
            "right" => Some(Self::RIGHT),
            _ => None,
        }
    }
}

/// Command produced by a handled key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// Close the tour.
    Close,
    /// Go to the next step.
    Next,
    /// Go to the previous step.
    Previous,
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Handled: stop propagation and prevent the default action.
    Consumed,
    /// Not handled: leave the event alone.
    Ignored,
}

impl KeyResponse {
    /// Whether the host should stop propagation and prevent the default.
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// Which navigation keys are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardNavigation {
    disabled: NavKeys,
}

impl KeyboardNavigation {
    /// Every key enabled.
    pub const ENABLED: Self = Self {
        disabled: NavKeys::empty(),
    };

    /// Every key disabled.
    pub const DISABLED: Self = Self {
        disabled: NavKeys::all(),
    };

    /// Disable exactly the given keys.
    pub const fn disable(keys: NavKeys) -> Self {
        Self { disabled: keys }
    }

    /// Blanket switch: `true` disables every key.
    pub const fn from_bool(disabled: bool) -> Self {
        if disabled { Self::DISABLED } else { Self::ENABLED }
    }

    /// Disabled key set.
    pub const fn disabled(&self) -> NavKeys {
        self.disabled
    }

    /// Check whether a key is enabled.
    pub const fn is_enabled(&self, key: NavKeys) -> bool {
        !self.disabled.intersects(key)
    }

    /// Translate a key event into a command, honouring the disable set.
    ///
    /// Release events never produce a command.
    pub fn command_for(&self, event: &KeyEvent) -> Option<NavCommand> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let (key, command) = match event.code {
            KeyCode::Escape => (NavKeys::ESC, NavCommand::Close),
            KeyCode::Right => (NavKeys::RIGHT, NavCommand::Next),
            KeyCode::Left => (NavKeys::LEFT, NavCommand::Previous),
            _ => return None,
        };
        self.is_enabled(key).then_some(command)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{KeyboardNavigation, NavKeys};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Blanket(bool),
        Keys(Vec<String>),
    }

    impl<'de> Deserialize<'de> for KeyboardNavigation {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match Repr::deserialize(deserializer)? {
                Repr::Blanket(flag) => Ok(Self::from_bool(flag)),
                Repr::Keys(names) => {
                    let mut keys = NavKeys::empty();
                    for name in &names {
                        let key = NavKeys::from_key_name(name).ok_or_else(|| {
                            D::Error::custom(format!("unknown navigation key: {name:?}"))
                        })?;
                        keys |= key;
                    }
                    Ok(Self::disable(keys))
                }
            }
        }
    }

    impl Serialize for KeyboardNavigation {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.disabled.is_empty() {
                return serializer.serialize_bool(false);
            }
            if self.disabled == NavKeys::all() {
                return serializer.serialize_bool(true);
            }
            let names: Vec<&str> = [
                (NavKeys::ESC, "esc"),
                (NavKeys::LEFT, "left"),
                (NavKeys::RIGHT, "right"),
            ]
            .into_iter()
            .filter(|(key, _)| self.disabled.contains(*key))
            .map(|(_, name)| name)
            .collect();
            names.serialize(serializer)
        }
    }
}
