//! In-memory terminal for tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Terminal, TerminalInput};

/// What a [`HeadlessTerminal`] has been asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessLog {
    /// Number of `initialize` calls.
    pub initialized: usize,
    /// Number of `uninitialize` calls.
    pub uninitialized: usize,
    /// Number of `poll_input` calls.
    pub polls: usize,
}

/// A terminal with a fixed size and a script of input.
///
/// Each `poll_input` call hands out the next scripted input, then reports
/// no input once the script runs dry. A scripted resize also changes the
/// reported size. The call log is shared, so it stays readable after the
/// terminal has been moved into a [`System`](crate::System).
#[derive(Debug)]
pub struct HeadlessTerminal {
    width: u16,
    height: u16,
    script: VecDeque<TerminalInput>,
    log: Arc<Mutex<HeadlessLog>>,
    fail_initialize: bool,
}

impl HeadlessTerminal {
    /// Create a terminal of the given size with no scripted input.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            script: VecDeque::new(),
            log: Arc::new(Mutex::new(HeadlessLog::default())),
            fail_initialize: false,
        }
    }

    /// Append one input to the script.
    pub fn with_input(mut self, input: TerminalInput) -> Self {
        self.script.push_back(input);
        self
    }

    /// Append several inputs to the script.
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = TerminalInput>) -> Self {
        self.script.extend(inputs);
        self
    }

    /// Make `initialize` fail, as a terminal without a tty would.
    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Shared call log.
    pub fn log(&self) -> Arc<Mutex<HeadlessLog>> {
        Arc::clone(&self.log)
    }
}

impl Terminal for HeadlessTerminal {
    fn initialize(&mut self) -> io::Result<()> {
        self.log.lock().initialized += 1;
        if self.fail_initialize {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "headless terminal refused to initialize"));
        }
        Ok(())
    }

    fn uninitialize(&mut self) -> io::Result<()> {
        self.log.lock().uninitialized += 1;
        Ok(())
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn poll_input(&mut self, _timeout: Duration) -> io::Result<Option<TerminalInput>> {
        self.log.lock().polls += 1;
        let input = self.script.pop_front();
        if let Some(TerminalInput::Resize { width, height }) = input {
            self.width = width;
            self.height = height;
        }
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::{KeyCode, KeyInput};

    use super::*;

    #[test]
    fn test_script_is_replayed_in_order() {
        let mut terminal = HeadlessTerminal::new(80, 24)
            .with_input(TerminalInput::Key(KeyInput::new(KeyCode::Enter)))
            .with_input(TerminalInput::Resize { width: 100, height: 30 });

        let first = terminal.poll_input(Duration::ZERO).unwrap();
        assert_eq!(first, Some(TerminalInput::Key(KeyInput::new(KeyCode::Enter))));
        assert_eq!(terminal.width(), 80);

        terminal.poll_input(Duration::ZERO).unwrap();
        assert_eq!((terminal.width(), terminal.height()), (100, 30));
        assert_eq!(terminal.poll_input(Duration::ZERO).unwrap(), None);
        assert_eq!(terminal.log().lock().polls, 3);
    }

    #[test]
    fn test_log_counts_lifecycle_calls() {
        let mut terminal = HeadlessTerminal::new(10, 10);
        let log = terminal.log();
        terminal.initialize().unwrap();
        terminal.uninitialize().unwrap();

        let log = log.lock();
        assert_eq!((log.initialized, log.uninitialized), (1, 1));
    }

    #[test]
    fn test_failing_initialize() {
        let mut terminal = HeadlessTerminal::new(10, 10).failing_initialize();
        assert!(terminal.initialize().is_err());
    }
}
