//! `crossterm`-backed terminal.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event as cte;
use trellis_core::{KeyCode, KeyInput, KeyboardModifiers};

use super::{Terminal, TerminalInput};
use crate::config::SystemConfig;

/// Fallback size when the terminal cannot report one.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// A real terminal on stdout.
///
/// `initialize` enters raw mode and, depending on the configuration, the
/// alternate screen with a hidden cursor. `uninitialize` undoes exactly what
/// was done; dropping an initialized terminal does the same on a best-effort
/// basis so a panicking application does not leave the shell in raw mode.
#[derive(Debug)]
pub struct CrosstermTerminal {
    alternate_screen: bool,
    hide_cursor: bool,
    width: u16,
    height: u16,
    active: bool,
}

impl CrosstermTerminal {
    /// Create a terminal with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&SystemConfig::default())
    }

    /// Create a terminal honouring the screen options of `config`.
    pub fn with_config(config: &SystemConfig) -> Self {
        let (width, height) = crossterm::terminal::size().unwrap_or(DEFAULT_SIZE);
        Self {
            alternate_screen: config.alternate_screen,
            hide_cursor: config.hide_cursor,
            width,
            height,
            active: false,
        }
    }

    /// Whether `initialize` has run without a matching `uninitialize`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn restore(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        if self.hide_cursor {
            crossterm::execute!(stdout, crossterm::cursor::Show)?;
        }
        if self.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;
        }
        crossterm::terminal::disable_raw_mode()?;
        stdout.flush()
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermTerminal {
    fn initialize(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        crossterm::terminal::enable_raw_mode()?;
        self.active = true;

        let mut stdout = io::stdout();
        if self.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        }
        if self.hide_cursor {
            crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        }
        stdout.flush()?;

        let (width, height) = crossterm::terminal::size()?;
        self.width = width;
        self.height = height;
        tracing::debug!(target: "trellis::terminal", width, height, "terminal initialized");
        Ok(())
    }

    fn uninitialize(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.restore()?;
        tracing::debug!(target: "trellis::terminal", "terminal restored");
        Ok(())
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<TerminalInput>> {
        if !cte::poll(timeout)? {
            return Ok(None);
        }
        let input = match cte::read()? {
            cte::Event::Key(key) => map_key_event(key).map(TerminalInput::Key),
            cte::Event::Resize(width, height) => {
                self.width = width;
                self.height = height;
                Some(TerminalInput::Resize { width, height })
            }
            _ => None,
        };
        Ok(input)
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(error) = self.restore() {
                tracing::warn!(target: "trellis::terminal", %error, "failed to restore terminal on drop");
            }
        }
    }
}

fn map_key_event(key: cte::KeyEvent) -> Option<KeyInput> {
    if key.kind == cte::KeyEventKind::Release {
        return None;
    }
    let code = map_key_code(key.code)?;
    Some(KeyInput::with_modifiers(code, map_modifiers(key.modifiers)))
}

fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::Insert => Some(KeyCode::Insert),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

fn map_modifiers(modifiers: cte::KeyModifiers) -> KeyboardModifiers {
    KeyboardModifiers {
        shift: modifiers.contains(cte::KeyModifiers::SHIFT),
        control: modifiers.contains(cte::KeyModifiers::CONTROL),
        alt: modifiers.contains(cte::KeyModifiers::ALT),
        meta: modifiers.intersects(cte::KeyModifiers::SUPER | cte::KeyModifiers::HYPER | cte::KeyModifiers::META),
    }
}
