//! Environment declaration
//!
//! Binds a Nutanix account and the subnet it provisions into. Values come from
//! `NTNX_ACCOUNT_NAME`, `NTNX_SUBNET` and `NTNX_SUBNET_CLUSTER`; all three are
//! required and must be non-empty.

use crate::env::{require, EnvSource};
use crate::error::{ConfigResult, DeclarationError};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ACCOUNT_NAME_VAR: &str = "NTNX_ACCOUNT_NAME";
pub const SUBNET_VAR: &str = "NTNX_SUBNET";
pub const SUBNET_CLUSTER_VAR: &str = "NTNX_SUBNET_CLUSTER";

/// Name given to environments declared straight from the process environment
pub const DEFAULT_ENVIRONMENT_NAME: &str = "SampleDslEnvironment";

/// Flat environment record as read from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub account_name: String,
    pub subnet_name: String,
    pub subnet_cluster: String,
}

impl EnvironmentConfig {
    pub fn new(
        account_name: impl Into<String>,
        subnet_name: impl Into<String>,
        subnet_cluster: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            subnet_name: subnet_name.into(),
            subnet_cluster: subnet_cluster.into(),
        }
    }

    /// Reads all three variables, failing on the first one missing or empty.
    pub fn from_env(source: &dyn EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            account_name: require(source, ACCOUNT_NAME_VAR)?,
            subnet_name: require(source, SUBNET_VAR)?,
            subnet_cluster: require(source, SUBNET_CLUSTER_VAR)?,
        })
    }

    /// Turns the record into a declaration with a single Nutanix provider.
    pub fn declare(&self, name: impl Into<String>) -> Environment {
        Environment {
            name: name.into(),
            providers: vec![Provider::Ntnx {
                account: AccountRef::new(&self.account_name),
                subnets: vec![SubnetRef::new(&self.subnet_name, &self.subnet_cluster)],
            }],
        }
    }
}

/// Reference to an account already registered with the framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub name: String,
}

impl AccountRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to an existing subnet inside a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRef {
    pub name: String,
    pub cluster: String,
}

impl SubnetRef {
    pub fn new(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
        }
    }
}

/// Cloud provider entry of an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Provider {
    Ntnx {
        account: AccountRef,
        subnets: Vec<SubnetRef>,
    },
}

impl Provider {
    pub fn account(&self) -> &AccountRef {
        match self {
            Provider::Ntnx { account, .. } => account,
        }
    }

    pub fn subnets(&self) -> &[SubnetRef] {
        match self {
            Provider::Ntnx { subnets, .. } => subnets,
        }
    }
}

/// Declarative environment handed to the provisioning framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub providers: Vec<Provider>,
}

impl Environment {
    pub fn builder(name: impl Into<String>) -> EnvironmentBuilder {
        EnvironmentBuilder::new(name)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountRef> {
        self.providers.iter().map(Provider::account)
    }

    pub fn subnets(&self) -> impl Iterator<Item = &SubnetRef> {
        self.providers.iter().flat_map(|p| p.subnets().iter())
    }
}

/// Builds an [`Environment`] with a single Nutanix provider
#[derive(Debug, Clone, Default)]
pub struct EnvironmentBuilder {
    name: String,
    account: Option<AccountRef>,
    subnets: Vec<SubnetRef>,
}

impl EnvironmentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn account(mut self, name: impl Into<String>) -> Self {
        self.account = Some(AccountRef::new(name));
        self
    }

    pub fn subnet(mut self, name: impl Into<String>, cluster: impl Into<String>) -> Self {
        self.subnets.push(SubnetRef::new(name, cluster));
        self
    }

    pub fn build(self) -> Result<Environment, DeclarationError> {
        if self.name.trim().is_empty() {
            return Err(DeclarationError::EmptyName { kind: "environment" });
        }

        let account = match self.account {
            Some(account) if !account.name.trim().is_empty() => account,
            _ => {
                return Err(DeclarationError::MissingAccount {
                    environment: self.name,
                })
            }
        };

        if self.subnets.is_empty() {
            return Err(DeclarationError::NoSubnets {
                environment: self.name,
            });
        }

        if self
            .subnets
            .iter()
            .any(|s| s.name.trim().is_empty() || s.cluster.trim().is_empty())
        {
            return Err(DeclarationError::EmptyName { kind: "subnet" });
        }

        Ok(Environment {
            name: self.name,
            providers: vec![Provider::Ntnx {
                account,
                subnets: self.subnets,
            }],
        })
    }
}

/// Loads the environment declaration from `source`.
pub fn load_environment(
    source: &dyn EnvSource,
    name: impl Into<String>,
) -> ConfigResult<Environment> {
    let config = EnvironmentConfig::from_env(source)?;
    let environment = config.declare(name);
    info!(
        environment = %environment.name,
        account = %config.account_name,
        subnet = %config.subnet_name,
        cluster = %config.subnet_cluster,
        "Loaded environment declaration"
    );
    Ok(environment)
}
