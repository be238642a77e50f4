//! Error types for litorm

use thiserror::Error;

/// Result type alias for litorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Failure to establish or configure the underlying connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// A fetch was attempted on a builder that already ran a terminal fetch
    #[error("Cannot execute a fetch: builder already fetched/counted a statement")]
    Finalized,

    /// Statement preparation or execution failed
    #[error("Execution error: {message}. Executed query was: {sql}")]
    Execution { sql: String, message: String },

    /// A record without a primary-key value was updated or deleted
    #[error("Cannot update or delete record: no primary key value set")]
    MissingPrimaryKey,

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrmError {
    /// Create an execution error carrying the offending SQL
    pub fn execution(sql: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            sql: sql.into(),
            message: message.to_string(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a reused-builder error
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// The compiled SQL attached to an execution error, if any
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Execution { sql, .. } => Some(sql),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
