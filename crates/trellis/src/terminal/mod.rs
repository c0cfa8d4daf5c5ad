//! Terminal backends.
//!
//! The toolkit talks to the terminal through the narrow [`Terminal`] trait:
//! set up and restore the screen, report its size, and hand over input.
//! Drawing cells is left to widget behaviours.
//!
//! - [`CrosstermTerminal`] drives a real terminal through `crossterm`.
//! - [`HeadlessTerminal`] has a fixed size and scripted input, for tests.

mod tty;
mod headless;

use std::time::Duration;

use trellis_core::KeyInput;

pub use self::tty::CrosstermTerminal;
pub use self::headless::{HeadlessLog, HeadlessTerminal};

/// Input read from the terminal, before it is routed to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalInput {
    /// A key press.
    Key(KeyInput),
    /// The terminal changed size.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
}

/// A terminal the dispatch loop can run on.
pub trait Terminal {
    /// Prepare the terminal for the toolkit (raw mode, alternate screen).
    fn initialize(&mut self) -> std::io::Result<()>;

    /// Restore the terminal to the state found by `initialize`.
    fn uninitialize(&mut self) -> std::io::Result<()>;

    /// Width in columns.
    fn width(&self) -> u16;

    /// Height in rows.
    fn height(&self) -> u16;

    /// Wait up to `timeout` for input.
    ///
    /// The default reports no input.
    fn poll_input(&mut self, _timeout: Duration) -> std::io::Result<Option<TerminalInput>> {
        Ok(None)
    }
}
