/// Result of one decode attempt
///
/// `NotFound` is the ordinary per-frame case and never reaches the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A symbol was located and decoded
    Found {
        /// Decoded payload text
        text: String,
    },
    /// No symbol in the frame
    NotFound,
    /// The engine failed on this frame
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl DecodeOutcome {
    /// Shorthand for `Found`
    pub fn found(text: impl Into<String>) -> Self {
        DecodeOutcome::Found { text: text.into() }
    }

    /// Shorthand for `Error`
    pub fn error(message: impl Into<String>) -> Self {
        DecodeOutcome::Error {
            message: message.into(),
        }
    }

    /// True for `Found`
    pub fn is_found(&self) -> bool {
        matches!(self, DecodeOutcome::Found { .. })
    }

    /// Decoded text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Found { text } => Some(text),
            _ => None,
        }
    }
}
