pub mod env;
pub mod environment;
pub mod error;
pub mod project;

pub use env::{optional, require, require_int, var_or, EnvSource, MapEnv, ProcessEnv};
pub use environment::{
    load_environment, AccountRef, Environment, EnvironmentBuilder, EnvironmentConfig, Provider,
    SubnetRef, DEFAULT_ENVIRONMENT_NAME,
};
pub use error::{ConfigError, ConfigResult, DeclarationError};
pub use project::{
    load_project, Project, ProjectBuilder, ProjectQuotaConfig, QuotaKind, DEFAULT_PROJECT_NAME,
};

pub mod prelude {
    pub use crate::env::*;
    pub use crate::environment::*;
    pub use crate::error::*;
    pub use crate::project::*;
}
