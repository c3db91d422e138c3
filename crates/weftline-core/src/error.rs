//! Error types for weftline-core

use thiserror::Error;

/// Result type alias for weftline-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in weftline-core
///
/// Location and declaration variants are raised by the builder call that
/// introduced the violation. A lookup that finds nothing is not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// A location was built without a global name
    #[error("location global name must be set before {operation}")]
    MissingGlobalName {
        /// The builder operation that required the global name
        operation: String,
    },

    /// The global name of a location was set twice
    #[error("location global name already set to '{current}'")]
    GlobalNameAlreadySet {
        /// Global name set by the first call
        current: String,
    },

    /// A location name or part is empty
    #[error("location {what} must not be empty")]
    EmptyLocationPart {
        /// `global name` or `part`
        what: String,
    },

    /// A location name or part contains a reserved character
    #[error("location part '{part}' contains reserved character '{character}'")]
    ReservedCharacter {
        /// Offending part
        part: String,
        /// The reserved character found
        character: char,
    },

    /// Two index parts were added one after the other
    #[error("index {index} cannot follow another index (previous part '{previous}')")]
    ConsecutiveIndex {
        /// Index being added
        index: String,
        /// The index part already at the end of the path
        previous: String,
    },

    /// A non-numeric part was added after `processors`
    #[error("part after 'processors' must be numeric, got '{part}'")]
    NonNumericProcessorIndex {
        /// Offending part
        part: String,
    },

    /// A declaration tree violates an ownership rule
    #[error("invalid structure in '{element}': {message}")]
    InvalidStructure {
        /// Name of the declaration being built
        element: String,
        /// Description of the violation
        message: String,
    },

    /// Two global elements share the same reference name
    #[error("duplicate global element refName '{ref_name}'")]
    DuplicateRefName {
        /// The repeated reference name
        ref_name: String,
    },

    /// A serialized artifact could not be parsed
    #[error("malformed artifact at line {line}, column {column}: {message} (near `{fragment}`)")]
    Malformed {
        /// 1-based line of the failure (0 when unknown)
        line: usize,
        /// 1-based column of the failure (0 when unknown)
        column: usize,
        /// Parser message
        message: String,
        /// The source line the parser stopped on
        fragment: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error was raised by a builder rejecting a structural violation
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingGlobalName { .. }
                | Self::GlobalNameAlreadySet { .. }
                | Self::EmptyLocationPart { .. }
                | Self::ReservedCharacter { .. }
                | Self::ConsecutiveIndex { .. }
                | Self::NonNumericProcessorIndex { .. }
                | Self::InvalidStructure { .. }
                | Self::DuplicateRefName { .. }
        )
    }
}
