use crate::catalog::CatalogError;
use declarations::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid order: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Playbook exited with {}", describe_exit(.code))]
    PlaybookFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}
