use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalignError {
    /// Unrecognized or malformed setting
    Config {
        /// The offending option name
        key: String,
        /// A human-readable message explaining the error
        message: String,
    },
    /// Input rejected at registration or by a collaborator
    InvalidInput(String),
    /// Score requested from an alignment without links; holds the alignment uid
    EmptyAlignment(String),
    /// Cluster pair or entity uid not present in the store
    Lookup(String),
    /// File system failure while reading or writing a session
    Io(String),
    /// Malformed session document
    Json(String),
}

impl GlobalignError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        GlobalignError::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for GlobalignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobalignError::Config { key, message } => {
                write!(f, "Configuration error for \"{}\": {}", key, message)
            }
            GlobalignError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            GlobalignError::EmptyAlignment(uid) => {
                write!(f, "Alignment {} has no links", uid)
            }
            GlobalignError::Lookup(msg) => write!(f, "Lookup error: {}", msg),
            GlobalignError::Io(msg) => write!(f, "I/O error: {}", msg),
            GlobalignError::Json(msg) => write!(f, "Session format error: {}", msg),
        }
    }
}

impl std::error::Error for GlobalignError {}

impl From<std::io::Error> for GlobalignError {
    fn from(e: std::io::Error) -> Self {
        GlobalignError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for GlobalignError {
    fn from(e: serde_json::Error) -> Self {
        GlobalignError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GlobalignError>;
