//! Project declaration with resource quotas
//!
//! Quota limits are read from `VCPUS`, `STORAGE` and `MEMORY`. Each must be a
//! base-10 integer; range checks are left to the framework consuming the
//! declaration.

use crate::env::{require_int, EnvSource};
use crate::error::{ConfigResult, DeclarationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

pub const VCPUS_VAR: &str = "VCPUS";
pub const STORAGE_VAR: &str = "STORAGE";
pub const MEMORY_VAR: &str = "MEMORY";

pub const DEFAULT_PROJECT_NAME: &str = "TestDslDemoProject";

/// Resource kinds a project quota can limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaKind {
    Vcpus,
    Storage,
    Memory,
}

impl QuotaKind {
    pub const ALL: [QuotaKind; 3] = [QuotaKind::Vcpus, QuotaKind::Storage, QuotaKind::Memory];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaKind::Vcpus => "vcpus",
            QuotaKind::Storage => "storage",
            QuotaKind::Memory => "memory",
        }
    }

    /// Environment variable the limit is read from
    pub fn env_var(&self) -> &'static str {
        match self {
            QuotaKind::Vcpus => VCPUS_VAR,
            QuotaKind::Storage => STORAGE_VAR,
            QuotaKind::Memory => MEMORY_VAR,
        }
    }
}

impl fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat quota record as read from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectQuotaConfig {
    pub vcpus: i64,
    pub storage: i64,
    pub memory: i64,
}

impl ProjectQuotaConfig {
    pub fn new(vcpus: i64, storage: i64, memory: i64) -> Self {
        Self {
            vcpus,
            storage,
            memory,
        }
    }

    pub fn from_env(source: &dyn EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            vcpus: require_int(source, VCPUS_VAR)?,
            storage: require_int(source, STORAGE_VAR)?,
            memory: require_int(source, MEMORY_VAR)?,
        })
    }

    pub fn get(&self, kind: QuotaKind) -> i64 {
        match kind {
            QuotaKind::Vcpus => self.vcpus,
            QuotaKind::Storage => self.storage,
            QuotaKind::Memory => self.memory,
        }
    }

    pub fn quotas(&self) -> BTreeMap<QuotaKind, i64> {
        QuotaKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .collect()
    }

    pub fn declare(&self, name: impl Into<String>) -> Project {
        Project {
            name: name.into(),
            quotas: self.quotas(),
        }
    }
}

/// Declarative project handed to the provisioning framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub quotas: BTreeMap<QuotaKind, i64>,
}

impl Project {
    pub fn builder(name: impl Into<String>) -> ProjectBuilder {
        ProjectBuilder::new(name)
    }

    pub fn quota(&self, kind: QuotaKind) -> Option<i64> {
        self.quotas.get(&kind).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectBuilder {
    name: String,
    quotas: BTreeMap<QuotaKind, i64>,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quotas: BTreeMap::new(),
        }
    }

    /// Sets a limit; setting the same kind twice keeps the last value.
    pub fn quota(mut self, kind: QuotaKind, limit: i64) -> Self {
        self.quotas.insert(kind, limit);
        self
    }

    pub fn build(self) -> Result<Project, DeclarationError> {
        if self.name.trim().is_empty() {
            return Err(DeclarationError::EmptyName { kind: "project" });
        }
        Ok(Project {
            name: self.name,
            quotas: self.quotas,
        })
    }
}

/// Loads the project declaration from `source`.
pub fn load_project(source: &dyn EnvSource, name: impl Into<String>) -> ConfigResult<Project> {
    let config = ProjectQuotaConfig::from_env(source)?;
    let project = config.declare(name);
    info!(
        project = %project.name,
        vcpus = config.vcpus,
        storage = config.storage,
        memory = config.memory,
        "Loaded project declaration"
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::error::ConfigError;

    fn quota_env(vcpus: &str, storage: &str, memory: &str) -> MapEnv {
        MapEnv::new()
            .with_var(VCPUS_VAR, vcpus)
            .with_var(STORAGE_VAR, storage)
            .with_var(MEMORY_VAR, memory)
    }

    #[test]
    fn test_load_project_example() {
        let project = load_project(&quota_env("4", "100", "8192"), "demo").unwrap();

        let expected: BTreeMap<QuotaKind, i64> = [
            (QuotaKind::Vcpus, 4),
            (QuotaKind::Storage, 100),
            (QuotaKind::Memory, 8192),
        ]
        .into_iter()
        .collect();
        assert_eq!(project.quotas, expected);
        assert_eq!(project.quota(QuotaKind::Memory), Some(8192));
    }

    #[test]
    fn test_quota_mapping_matches_inputs() {
        for (v, s, m) in [(1, 1, 1), (16, 2_000_000_000_000, 64_000_000_000), (0, 0, 0)] {
            let env = quota_env(&v.to_string(), &s.to_string(), &m.to_string());
            let config = ProjectQuotaConfig::from_env(&env).unwrap();
            assert_eq!(config, ProjectQuotaConfig::new(v, s, m));
            assert_eq!(config.quotas().len(), 3);
        }
    }

    #[test]
    fn test_missing_quota_variable_fails() {
        for kind in QuotaKind::ALL {
            let mut env = quota_env("4", "100", "8192");
            env.remove(kind.env_var());
            let err = ProjectQuotaConfig::from_env(&env).unwrap_err();
            assert_eq!(
                err,
                ConfigError::MissingVariable {
                    name: kind.env_var().to_string()
                }
            );
        }
    }

    #[test]
    fn test_empty_quota_reported_as_missing() {
        let err = ProjectQuotaConfig::from_env(&quota_env("", "100", "8192")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyVariable {
                name: VCPUS_VAR.to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "missing required configuration variable VCPUS (set but empty)"
        );
    }

    #[test]
    fn test_non_numeric_quota_fails() {
        let err = ProjectQuotaConfig::from_env(&quota_env("4", "lots", "8192")).unwrap_err();
        assert_eq!(err.variable(), STORAGE_VAR);
        assert!(matches!(err, ConfigError::InvalidInteger { .. }));
    }

    #[test]
    fn test_reload_is_idempotent() {
        let env = quota_env("8", "500", "1024");
        assert_eq!(
            load_project(&env, "demo").unwrap(),
            load_project(&env, "demo").unwrap()
        );
    }

    #[test]
    fn test_serialized_quota_keys() {
        let project = ProjectQuotaConfig::new(4, 100, 8192).declare("demo");
        let json = serde_json::to_string(&project).unwrap();
        assert_eq!(
            json,
            r#"{"name":"demo","quotas":{"vcpus":4,"storage":100,"memory":8192}}"#
        );
    }

    #[test]
    fn test_builder() {
        let project = Project::builder("demo")
            .quota(QuotaKind::Vcpus, 2)
            .quota(QuotaKind::Vcpus, 3)
            .build()
            .unwrap();
        assert_eq!(project.quota(QuotaKind::Vcpus), Some(3));
        assert_eq!(project.quota(QuotaKind::Storage), None);

        assert_eq!(
            Project::builder(" ").build(),
            Err(DeclarationError::EmptyName { kind: "project" })
        );
    }

    #[test]
    fn test_quota_kind_display() {
        assert_eq!(QuotaKind::Vcpus.to_string(), "vcpus");
        assert_eq!(QuotaKind::Memory.env_var(), "MEMORY");
    }
}
