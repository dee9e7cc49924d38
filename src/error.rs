//! Policy error types

use thiserror::Error;

/// Errors surfaced by the classification policy.
///
/// Ungoverned input (no classification, unknown code, no governed group) is
/// never an error; it resolves to `Decision::Unknown` or an unchanged query.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Rule table failed validation at construction time
    #[error("invalid rule table: {message}")]
    InvalidRuleTable { message: String },

    /// Principal name could not be resolved by the directory
    #[error("unresolved identity: {name}")]
    UnresolvedIdentity { name: String },

    /// Config source is present but unusable
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// Config document could not be parsed
    #[error("config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Config file could not be read
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PolicyError {
    pub fn invalid_rule_table(message: impl Into<String>) -> Self {
        Self::InvalidRuleTable {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn unresolved_identity(name: impl Into<String>) -> Self {
        Self::UnresolvedIdentity { name: name.into() }
    }
}

/// Result type alias for policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;
