//! Error types for Trellis.

use thiserror::Error;

use crate::object::ObjectError;

/// The main error type for Trellis operations.
#[derive(Error, Debug)]
pub enum TrellisError {
    /// A tree operation referred to a dead widget or would create a cycle.
    #[error("object error: {0}")]
    Object(#[from] ObjectError),

    /// The terminal backend failed to initialize, tear down, or read input.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The animation ticker could not be started.
    #[error("animation error: {0}")]
    Animation(#[from] AnimationError),
}

/// Animation engine errors.
#[derive(Error, Debug)]
pub enum AnimationError {
    /// The ticker thread could not be spawned.
    #[error("failed to spawn animation ticker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The ticker is already running.
    #[error("animation ticker is already running")]
    AlreadyRunning,
}

/// A specialized Result type for Trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TrellisError::from(ObjectError::InvalidWidgetId);
        assert_eq!(err.to_string(), "object error: invalid or destroyed widget id");

        let err = TrellisError::from(AnimationError::AlreadyRunning);
        assert_eq!(err.to_string(), "animation error: animation ticker is already running");
    }

    #[test]
    fn test_io_error_converts_to_terminal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no tty");
        assert!(matches!(TrellisError::from(io), TrellisError::Terminal(_)));
    }
}
