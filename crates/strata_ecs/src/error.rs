//! # ECS Error Types
//!
//! Absence of a component or a storage is never an error; it is reported
//! through `Option`. The variants below cover contract violations and
//! configuration failures only.

use thiserror::Error;

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A dynamic visitor signature did not start with the entity handle.
    #[error("dynamic visitor must take the entity handle as its first parameter")]
    MissingEntityParam,

    /// A dynamic visitor signature declared no component parameters.
    #[error("dynamic visitor must declare at least one component parameter")]
    NoComponentParams,

    /// The entity handle was declared again after the first parameter.
    #[error("entity handle declared again at parameter {position}")]
    UnexpectedEntityParam {
        /// Zero-based parameter position of the repeated handle.
        position: usize,
    },

    /// The same component type was requested twice in one iteration.
    #[error("component type {name} requested more than once")]
    DuplicateComponent {
        /// Type name of the repeated component.
        name: &'static str,
    },

    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be decoded.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
