//! The error type shared by every encode and decode operation.

use thiserror::Error;

/// Error raised by any failing encode or decode.
///
/// Carries the slash-separated path of the field being processed when the
/// failure occurred (e.g. `header/chunks/2/len`) and a human-readable
/// message. The message text is not a stable contract; match on nothing
/// beyond the type itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} (at {path})")]
pub struct Error {
    /// Field path where the failure occurred. `/` denotes the top level.
    pub path: String,
    /// Description of the failure.
    pub message: String,
}

impl Error {
    /// Creates an error at the given path.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::new("header/len", "end of buffer");
        assert_eq!(err.to_string(), "end of buffer (at header/len)");
    }
}
