use std::num::ParseIntError;
use thiserror::Error;

/// Errors raised while reading configuration from an environment source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration variable {name}")]
    MissingVariable { name: String },

    #[error("missing required configuration variable {name} (set but empty)")]
    EmptyVariable { name: String },

    #[error("configuration variable {name} must be a base-10 integer, got '{value}': {source}")]
    InvalidInteger {
        name: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl ConfigError {
    /// Name of the offending variable
    pub fn variable(&self) -> &str {
        match self {
            ConfigError::MissingVariable { name }
            | ConfigError::EmptyVariable { name }
            | ConfigError::InvalidInteger { name, .. } => name,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised when a declaration is assembled by hand through a builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("environment '{environment}' has no account reference")]
    MissingAccount { environment: String },

    #[error("environment '{environment}' references no subnets")]
    NoSubnets { environment: String },
}
