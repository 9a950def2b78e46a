#![forbid(unsafe_code)]

//! Canonical keyboard event types.
//!
//! Hosts translate their native key events into [`KeyEvent`] before handing
//! them to a tour. Only the keys a tour reacts to get dedicated variants;
//! everything else is [`KeyCode::Char`] or [`KeyCode::Other`].
//!
//! Modifier state is not carried. Tour commands are bound to bare keys and
//! hosts that want to leave `Ctrl+Arrow` to the page filter before calling
//! in.

/// A key as seen by a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key.
    pub code: KeyCode,
    /// Down, held or up.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key-down event.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Tab key.
    Tab,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Any key the tour has no use for, by legacy key code.
    Other(u32),
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(0),
                }
            }
        }
    }

    /// Map a legacy DOM `KeyboardEvent.keyCode` value.
    #[must_use]
    pub const fn from_key_code(code: u32) -> Self {
        match code {
            27 => Self::Escape,
            37 => Self::Left,
            38 => Self::Up,
            39 => Self::Right,
            40 => Self::Down,
            13 => Self::Enter,
            9 => Self::Tab,
            other => Self::Other(other),
        }
    }
}

/// Phase of a key event.
///
/// DOM hosts only ever see `keydown`/`keyup`; `repeat` is set when
/// `KeyboardEvent.repeat` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}
