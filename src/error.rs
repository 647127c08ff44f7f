//! Error types for switch sessions and configuration backups.
//!
//! Every failure a switch can produce during one backup attempt maps to a
//! [`SwitchError`] variant. The variants are distinct enough for a caller that
//! walks a list of switches to log the failure and continue with the next one.

use thiserror::Error;

/// Errors that can occur while talking to an Instant On switch.
#[derive(Error, Debug)]
pub enum SwitchError {
    /// The HTTP transport failed (connect, read, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The switch answered with a non-success HTTP status.
    ///
    /// The raw response body is kept because the device frequently explains
    /// the rejection there.
    #[error("GET {url} returned HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// The device returned malformed or incomplete XML.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The switch explicitly rejected the login.
    ///
    /// Any non-zero `statusCode` counts as a rejection, negative codes
    /// included.
    #[error("authentication rejected: statusCode={code} {message}")]
    Authentication { code: i64, message: String },

    /// The session path prefix could not be discovered.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Encrypting the credential blob with the device key failed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// The switch inventory could not be loaded.
    #[error("inventory error: {0}")]
    Inventory(String),

    /// Reading or writing a backup artifact failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwitchError {
    /// Returns true for transport failures and non-OK HTTP responses.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::HttpStatus { .. })
    }

    /// Short label of the error class, used in log lines and run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } => "network",
            Self::Configuration(_) => "configuration",
            Self::Authentication { .. } => "authentication",
            Self::Protocol(_) => "protocol",
            Self::Encryption(_) => "encryption",
            Self::Inventory(_) => "inventory",
            Self::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for SwitchError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, which may contain credentials.
        Self::Network(err.without_url().to_string())
    }
}
