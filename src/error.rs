use thiserror::Error;

/// Exit code recorded for a command that ran to completion
pub const EXIT_OK: i32 = 0;

/// Exit code recorded when a built-in rejects its arguments
pub const EXIT_USAGE: i32 = 2;

/// Exit code recorded for a name missing from the command table
pub const EXIT_NOT_FOUND: i32 = 127;

/// User-input failures raised while interpreting a command line.
///
/// Neither variant is fatal: the dispatcher renders the message inline on the
/// session's surface and records it in history with [`CommandError::exit_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A required argument was missing or malformed
    #[error("Usage: {usage}")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    /// The command name is not a built-in
    #[error("Command not found: {name}")]
    NotFound { name: String },
}

impl CommandError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => EXIT_USAGE,
            Self::NotFound { .. } => EXIT_NOT_FOUND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let usage = CommandError::Usage {
            command: "ping",
            usage: "ping [ip_address]",
        };
        assert_eq!(usage.to_string(), "Usage: ping [ip_address]");
        assert_eq!(usage.exit_code(), EXIT_USAGE);

        let missing = CommandError::NotFound {
            name: "foobar".to_string(),
        };
        assert_eq!(missing.to_string(), "Command not found: foobar");
        assert_eq!(missing.exit_code(), EXIT_NOT_FOUND);
    }
}
