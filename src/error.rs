use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of a [`LedgerError`], for callers that map failures
/// onto their own surface (status codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Storage,
    Input,
}

#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    /// Input breaks a business rule. The caller must correct the input.
    #[error("{0}")]
    #[diagnostic(code(ledger::validation))]
    Validation(String),

    /// A uniqueness constraint (email, document) would be violated.
    #[error("{0}")]
    #[diagnostic(code(ledger::conflict))]
    Conflict(String),

    #[error("{entity} {id} not found")]
    #[diagnostic(code(ledger::not_found))]
    NotFound { entity: &'static str, id: String },

    /// Unclassified failure of the underlying store, passed through unchanged.
    #[error("Storage error: {0}")]
    #[diagnostic(code(ledger::storage))]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("CSV error: {0}")]
    #[diagnostic(code(ledger::input))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(ledger::input))]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(Box::new(std::io::Error::other(message.into())))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Csv(_) | Self::Io(_) => ErrorKind::Input,
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
