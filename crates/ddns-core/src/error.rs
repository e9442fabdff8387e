//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! Only [`Error::ZoneNotFound`] and [`Error::RecordNotFound`] are recovered
//! by the reconciler (logged and skipped). Everything else aborts the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be loaded
    #[error("Unable to load config: {0}")]
    Config(#[from] ConfigError),

    /// Provider reported `success: false` or an unusable response
    #[error("Provider API error: {0}")]
    Api(String),

    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Public address lookup failed
    #[error("Address resolution failed: {0}")]
    AddressResolution(String),

    /// Configured zone is not owned by the account
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Configured record does not exist under its zone
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A provider response body did not decode into the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a provider API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an address resolution error
    pub fn address(msg: impl Into<String>) -> Self {
        Self::AddressResolution(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(name: impl Into<String>) -> Self {
        Self::ZoneNotFound(name.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(name: impl Into<String>) -> Self {
        Self::RecordNotFound(name.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the reconciler may log this error and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ZoneNotFound(_) | Self::RecordNotFound(_))
    }
}

/// Failure to produce a typed [`crate::Config`] from a file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed JSON
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document is JSON but does not match the schema
    #[error("{}: {}", path.display(), ViolationList(violations))]
    Invalid {
        path: PathBuf,
        violations: Vec<Violation>,
    },
}

impl ConfigError {
    /// Schema violations, empty for read and parse failures
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { violations, .. } => violations,
            _ => &[],
        }
    }
}

/// A single schema violation at a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Property path, e.g. `zone[2].dnsEntries[0]`
    pub field: String,
    /// What was expected there
    pub kind: ViolationKind,
}

impl Violation {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::Missing,
        }
    }

    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self {
            field: field.into(),
            kind: ViolationKind::WrongType { expected },
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => {
                write!(f, "Property '{}' is a required field.", self.field)
            }
            ViolationKind::WrongType { expected } => {
                write!(f, "Property '{}' must be {}.", self.field, expected)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Absent, null or empty where a value is required
    Missing,
    /// Present but of the wrong JSON type
    WrongType { expected: &'static str },
}

struct ViolationList<'a>(&'a [Violation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}
