//! Keyboard input payloads carried by [`EventKind::Input`](crate::EventKind::Input).

/// Keyboard modifiers held during an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        shift: false,
        control: false,
        alt: true,
        meta: false,
    };

    /// Returns true if no modifier is held.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// A key on the terminal keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Tab,
    /// Shift+Tab, as reported by most terminals.
    BackTab,
    Backspace,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Insert,
    /// Function key `F(n)`.
    F(u8),
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers held at the time.
    pub modifiers: KeyboardModifiers,
}

impl KeyInput {
    /// A key press without modifiers.
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A key press with modifiers.
    pub fn with_modifiers(code: KeyCode, modifiers: KeyboardModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Returns true for Ctrl+C.
    pub fn is_interrupt(&self) -> bool {
        self.modifiers.control && matches!(self.code, KeyCode::Char('c') | KeyCode::Char('C'))
    }
}

/// User input delivered to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press.
    Key(KeyInput),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_detection() {
        let ctrl_c = KeyInput::with_modifiers(KeyCode::Char('c'), KeyboardModifiers::CTRL);
        assert!(ctrl_c.is_interrupt());
        assert!(!KeyInput::new(KeyCode::Char('c')).is_interrupt());
        assert!(!KeyInput::with_modifiers(KeyCode::Char('x'), KeyboardModifiers::CTRL).is_interrupt());
    }

    #[test]
    fn test_modifiers_empty() {
        assert!(KeyboardModifiers::default().is_empty());
        assert!(!KeyboardModifiers::SHIFT.is_empty());
    }
}
