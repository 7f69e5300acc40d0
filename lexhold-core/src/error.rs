//! Error types for LEXHOLD operations

use crate::NodeId;
use std::fmt;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Node not found: {node}")]
    NotFound { node: NodeId },

    #[error("Duplicate child name '{name}' under {parent}")]
    DuplicateName { parent: NodeId, name: String },

    #[error("Invalid node name: '{name}'")]
    InvalidName { name: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Association failed: {reason}")]
    AssociationFailed { reason: String },
}

/// Argument validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Collection must not be empty: {field}")]
    EmptyCollection { field: String },

    #[error("Node for {field} does not exist: {node}")]
    NodeAbsent { field: String, node: NodeId },
}

/// Content model integrity errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Can't perform hold operation because node {name} ({node}) is not a hold")]
    NotAHold { node: NodeId, name: String },

    #[error("Can't add {name} to hold: only record folders and content can be held")]
    InvalidHoldItemType { name: String },

    #[error("Can't add {name} to hold because it is archived")]
    ArchivedItem { name: String },

    #[error("Can't add {name} to hold because it is locked")]
    LockedItem { name: String },

    #[error("Frozen node {name} ({node}) can't be updated or deleted")]
    FrozenNode { node: NodeId, name: String },
}

/// Permission errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Access denied for {actor}: {action} on {node}")]
    Denied {
        actor: String,
        action: String,
        node: NodeId,
    },

    #[error("Access denied: you don't have permission on the held items {names:?} ({total} in total)")]
    HeldItemsNotAccessible { names: Vec<String>, total: usize },

    #[error("Hold permission error: {reason}")]
    HoldPermission { reason: String },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Coarse classification of every [`HoldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvariantViolation,
    AccessDenied,
    NotFound,
    Storage,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "InvalidArgument"),
            ErrorKind::InvariantViolation => write!(f, "InvariantViolation"),
            ErrorKind::AccessDenied => write!(f, "AccessDenied"),
            ErrorKind::NotFound => write!(f, "NotFound"),
            ErrorKind::Storage => write!(f, "Storage"),
            ErrorKind::Config => write!(f, "Config"),
        }
    }
}

/// Master error type for all LEXHOLD errors.
#[derive(Debug, Error)]
pub enum HoldError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl HoldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HoldError::Storage(StorageError::NotFound { .. }) => ErrorKind::NotFound,
            HoldError::Storage(StorageError::DuplicateName { .. }) => ErrorKind::InvariantViolation,
            HoldError::Storage(_) => ErrorKind::Storage,
            HoldError::Validation(_) => ErrorKind::InvalidArgument,
            HoldError::Integrity(_) => ErrorKind::InvariantViolation,
            HoldError::Access(_) => ErrorKind::AccessDenied,
            HoldError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredFieldMissing {
            field: field.into(),
        }
        .into()
    }

    pub fn empty_collection(field: impl Into<String>) -> Self {
        ValidationError::EmptyCollection {
            field: field.into(),
        }
        .into()
    }
}

/// Result type alias for LEXHOLD operations.
pub type HoldResult<T> = Result<T, HoldError>;

// =============================================================================
// TESTS
// =============================================================================
