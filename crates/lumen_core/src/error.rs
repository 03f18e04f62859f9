//! Error types for lumen_core

use thiserror::Error;

/// Errors surfaced by the Lumen runtime
///
/// Attribute values never produce errors: malformed configuration falls back
/// to defaults. These variants cover the host-facing surfaces only.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Failed to read a configuration file
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Failed to serialize a configuration
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// No widget is registered for a tag
    #[error("Unknown component tag: {0}")]
    UnknownTag(String),

    /// Tag is not a valid custom element name
    #[error("Invalid custom element name: {0}")]
    InvalidTag(String),

    /// Tag is already registered
    #[error("Component already defined: {0}")]
    AlreadyDefined(String),
}

/// Failure reported by the reactive framework while reprocessing a subtree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Enhancement of <{tag}> failed: {message}")]
pub struct EnhanceError {
    pub tag: String,
    pub message: String,
}

impl EnhanceError {
    pub fn new(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

/// Result type for lumen_core operations
pub type Result<T> = std::result::Result<T, LumenError>;
