//! Error types for minorm operations.

use std::fmt;

use crate::value::Value;

/// The primary error type for all minorm operations.
#[derive(Debug)]
pub enum Error {
    /// No mapping was registered for the requested entity type
    UnmappedType {
        /// The entity type name that was requested
        type_name: String,
    },
    /// A second instance was attached for a (type, key) pair already tracked
    DuplicateIdentity {
        /// Entity type name
        entity: &'static str,
        /// The conflicting primary key
        key: Value,
    },
    /// An update was issued for a key already tracked by a different instance
    NonUniqueIdentity {
        /// Entity type name
        entity: &'static str,
        /// The conflicting primary key
        key: Value,
    },
    /// A flushed statement affected an unexpected number of rows
    StaleState {
        /// Qualified table the statement targeted
        table: String,
        /// Rows the statement was expected to affect
        expected: u64,
        /// Rows actually affected
        actual: u64,
    },
    /// Batch size outside the valid range
    InvalidBatchSize {
        /// The rejected size
        requested: usize,
    },
    /// Primary-key generation failed
    KeyGeneration {
        /// Entity type name
        entity: &'static str,
        /// What went wrong
        message: String,
    },
    /// Storage backend errors
    Store(StoreError),
    /// Row/value conversion errors
    Type(TypeError),
    /// Configuration errors
    Config(ConfigError),
    /// Serialization/deserialization errors
    Serde(String),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Transaction state violation (begin while active, commit without begin)
    Transaction,
    /// The store rejected a statement
    Statement,
    /// The store handle is no longer usable
    Closed,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl Error {
    /// Shorthand for a transaction-state store error.
    pub fn transaction(message: impl Into<String>) -> Self {
        Error::Store(StoreError {
            kind: StoreErrorKind::Transaction,
            message: message.into(),
        })
    }

    /// Shorthand for a rejected-statement store error.
    pub fn statement(message: impl Into<String>) -> Self {
        Error::Store(StoreError {
            kind: StoreErrorKind::Statement,
            message: message.into(),
        })
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
        })
    }

    /// Is this the stale-row condition surfaced at flush?
    pub fn is_stale_state(&self) -> bool {
        matches!(self, Error::StaleState { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnmappedType { type_name } => {
                write!(f, "no mapping registered for entity type '{}'", type_name)
            }
            Error::DuplicateIdentity { entity, key } => write!(
                f,
                "a different instance with the same identifier is already tracked: {} #{:?}",
                entity, key
            ),
            Error::NonUniqueIdentity { entity, key } => write!(
                f,
                "a different object with the same identifier value was already associated with the session: {} #{:?}",
                entity, key
            ),
            Error::StaleState {
                table,
                expected,
                actual,
            } => write!(
                f,
                "batch update returned unexpected row count from update on '{}'; actual row count: {}; expected: {}",
                table, actual, expected
            ),
            Error::InvalidBatchSize { requested } => {
                write!(f, "batch size must be at least 1, got {}", requested)
            }
            Error::KeyGeneration { entity, message } => {
                write!(f, "key generation failed for {}: {}", entity, message)
            }
            Error::Store(e) => write!(f, "Store error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Convenient Result alias for minorm operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_state_display_reports_counts() {
        let err = Error::StaleState {
            table: "docs.document".to_string(),
            expected: 1,
            actual: 0,
        };
        let text = err.to_string();
        assert!(text.contains("actual row count: 0"));
        assert!(text.contains("expected: 1"));
        assert!(err.is_stale_state());
    }

    #[test]
    fn unmapped_type_names_the_type() {
        let err = Error::UnmappedType {
            type_name: "Widget".to_string(),
        };
        assert!(err.to_string().contains("Widget"));
    }

    #[test]
    fn store_error_converts() {
        let err: Error = StoreError {
            kind: StoreErrorKind::Transaction,
            message: "no active transaction".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            Error::Store(StoreError {
                kind: StoreErrorKind::Transaction,
                ..
            })
        ));
    }
}
