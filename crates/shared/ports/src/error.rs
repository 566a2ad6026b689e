use thiserror::Error;

/// Failures talking to the terminal or its collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraderError {
    /// Connection lost, short read or an undecodable envelope.
    /// The command channel is unusable afterwards.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The terminal answered with a non-empty `lua_error`
    #[error("Terminal error in {cmd}: {message}")]
    Remote { cmd: String, message: String },

    /// Payload present but of an unexpected shape
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl TraderError {
    /// Only transport failures end the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, TraderError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, TraderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_fatal() {
        assert!(TraderError::Transport("eof".into()).is_fatal());
        assert!(
            !TraderError::Remote {
                cmd: "sendTransaction".into(),
                message: "not connected".into()
            }
            .is_fatal()
        );
        assert!(!TraderError::NotFound("portfolio".into()).is_fatal());
    }
}
