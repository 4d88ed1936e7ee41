use thiserror::Error;

/// Errors that can occur while importing a batch or a single record.
///
/// `Upstream` and `Envelope` abort the whole batch. Every other variant is
/// scoped to one record: the importer logs it, stores it in the
/// [`ImportReport`](crate::import::ImportReport) and moves on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The upstream API could not be reached or answered with a non-2xx status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The response body is not a `{status, payloads}` envelope, or its
    /// status is not `success`.
    #[error("invalid envelope: {0}")]
    Envelope(String),

    /// A single payload could not be decoded into a record.
    #[error("payload error: {0}")]
    Payload(String),

    /// A required field is missing from the payload.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// The referenced company does not exist in the ledger.
    #[error("company '{0}' not found")]
    CompanyNotFound(String),

    /// The company lacks a default income or receivable account.
    #[error("missing accounts in company: {0}")]
    MissingAccounts(String),

    /// The posting date could not be parsed.
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    /// The document builder rejected the assembled document.
    #[error("builder error: {0}")]
    Builder(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Whether this error aborts the whole batch rather than one record.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Envelope(_))
    }
}

/// Errors raised by a [`Store`](crate::store::Store) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// A record with this name already exists.
    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: &'static str, name: String },

    /// The store refused the operation (validation, state transition).
    #[error("rejected: {0}")]
    Rejected(String),

    /// Backend-specific failure (connection, serialization).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }
}
