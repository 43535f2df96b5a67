//! Error types for audio-property-listener.

use crate::core::Status;

/// Result type alias for listener operations.
pub type Result<T> = std::result::Result<T, ListenerError>;

/// Errors returned by [`PropertyChangeListener`](crate::core::PropertyChangeListener)
/// and its supporting types.
///
/// Match on the variant, not on [`ListenerError::code`]: the integer mapping
/// exists for logging and for bridging into status-code based callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    /// `start` was called while a subscription is already active.
    #[error("Listener is already listening")]
    AlreadyListening,

    /// `stop` was called while no subscription is active.
    #[error("Listener is already stopped")]
    AlreadyStopped,

    /// The subsystem rejected a subscribe or unsubscribe call.
    #[error("Subsystem call failed with status {0}")]
    Subsystem(Status),

    /// The listener could not be configured.
    #[error("Listener configuration error: {0}")]
    Configuration(String),
}

impl ListenerError {
    /// Code reported for [`ListenerError::AlreadyListening`].
    pub const ALREADY_LISTENING_CODE: i32 = 2000;
    /// Code reported for [`ListenerError::AlreadyStopped`].
    pub const ALREADY_STOPPED_CODE: i32 = 2001;
    /// Code reported for [`ListenerError::Configuration`].
    pub const CONFIGURATION_CODE: i32 = 2002;

    /// Canonical integer code for this error.
    ///
    /// Subsystem failures report the underlying status verbatim.
    pub fn code(&self) -> i32 {
        match self {
            Self::AlreadyListening => Self::ALREADY_LISTENING_CODE,
            Self::AlreadyStopped => Self::ALREADY_STOPPED_CODE,
            Self::Subsystem(status) => status.code(),
            Self::Configuration(_) => Self::CONFIGURATION_CODE,
        }
    }

    /// Returns true for the double-start/double-stop misuse errors.
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::AlreadyListening | Self::AlreadyStopped)
    }

    /// The subsystem status carried by this error, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Subsystem(status) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "settings")]
impl From<config::ConfigError> for ListenerError {
    fn from(err: config::ConfigError) -> Self {
        ListenerError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ListenerError::AlreadyListening.code(),
            ListenerError::AlreadyStopped.code(),
            ListenerError::Configuration("x".into()).code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn test_subsystem_code_passthrough() {
        let err = ListenerError::Subsystem(Status::BAD_OBJECT);
        assert_eq!(err.code(), Status::BAD_OBJECT.code());
        assert_eq!(err.status(), Some(Status::BAD_OBJECT));
        assert!(!err.is_state_error());
    }

    #[test]
    fn test_display() {
        let err = ListenerError::Subsystem(Status::BAD_OBJECT);
        assert_eq!(err.to_string(), "Subsystem call failed with status '!obj'");
        assert!(ListenerError::AlreadyStopped.is_state_error());
    }
}
