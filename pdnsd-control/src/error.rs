//! Error types for control operations

use thiserror::Error;

/// Exit status reserved for failures detected on the client side
/// (usage, validation and transport errors).
pub const CLIENT_FAILURE_EXIT: u8 = 2;

/// Placeholder reported when the daemon signals failure but its message
/// could not be read.
pub const MISSING_MESSAGE: &str = "(could not read error message)";

/// Errors that can occur during control operations
#[derive(Debug, Error)]
pub enum ControlError {
    /// No command was given at all
    #[error("No command given")]
    MissingCommand,

    /// A token did not match any entry of the table it was looked up in
    #[error("Unknown {kind}: {token}")]
    UnknownToken {
        /// What the token was expected to be (command, server action, ...)
        kind: &'static str,
        /// The offending token, verbatim
        token: String,
    },

    /// Argument count outside the admissible range for a command
    #[error("Wrong number of arguments for '{command}'\nUsage: {usage}")]
    ArgumentCount {
        command: &'static str,
        usage: &'static str,
    },

    /// An optional argument was given where no remaining slot accepts it
    #[error("Unexpected argument for '{command}': {token}\nUsage: {usage}")]
    UnexpectedArgument {
        command: &'static str,
        token: String,
        usage: &'static str,
    },

    /// TTL is not a non-negative 32-bit value
    #[error("Bad TTL: {0}")]
    InvalidTtl(String),

    /// MX preference is not a 16-bit value
    #[error("Bad MX preference: {0}")]
    InvalidPreference(String),

    /// Address literal does not parse for the record type
    #[error("Bad {family} address: {value}")]
    InvalidAddress {
        family: &'static str,
        value: String,
    },

    /// A string field does not fit the 16-bit length prefix
    #[error("{field} too long: {len} bytes (max {max})", max = u16::MAX)]
    FieldTooLong { field: &'static str, len: usize },

    /// I/O error communicating with the control socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Control socket path does not exist
    #[error("Invalid socket path: {0}")]
    InvalidSocketPath(String),

    /// The daemon accepted only part of the request frame
    #[error("Short write to control socket: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Connection closed before the result code arrived
    #[error("Connection closed")]
    ConnectionClosed,

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// The daemon answered with a non-zero result code
    #[error("Failed: {message}")]
    Daemon { code: u16, message: String },
}

impl ControlError {
    /// Returns `true` for errors detected before any socket activity.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingCommand
                | Self::UnknownToken { .. }
                | Self::ArgumentCount { .. }
                | Self::UnexpectedArgument { .. }
                | Self::InvalidTtl(_)
                | Self::InvalidPreference(_)
                | Self::InvalidAddress { .. }
                | Self::FieldTooLong { .. }
        )
    }

    /// Process exit status for this error.
    ///
    /// Daemon failures report the daemon's own result code, saturated to the
    /// range an exit status can carry. Everything else is a client failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Daemon { code, .. } => u8::try_from(*code).unwrap_or(u8::MAX),
            _ => CLIENT_FAILURE_EXIT,
        }
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
