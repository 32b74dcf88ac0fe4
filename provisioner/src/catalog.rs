//! Plans and storage options offered by the portal, with their prices.
//!
//! The built-in catalog can be replaced by a TOML file of the form:
//!
//! ```toml
//! [plans.small]
//! vcpus = 10
//! memory_gb = 20
//! price = 500
//!
//! [storage."1000000000000"]
//! display = "1 TB"
//! price = 100
//! ```

use declarations::ProjectQuotaConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const BYTES_PER_GB: i64 = 1_000_000_000;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown plan: {name}")]
    UnknownPlan { name: String },

    #[error("Unknown storage option: {bytes}")]
    UnknownStorage { bytes: String },

    #[error("Storage option key '{key}' is not a positive byte count")]
    InvalidStorageKey { key: String },

    #[error("Catalog must offer at least one plan and one storage option")]
    Empty,

    #[error("Price of plan {plan} with storage {bytes} does not fit in a u32")]
    PriceOverflow { plan: String, bytes: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A compute bundle sold as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub vcpus: u32,
    pub memory_gb: u32,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOption {
    pub display: String,
    pub price: u32,
}

/// Everything a customer can pick from, keyed the way the API receives it:
/// plans by name, storage by its size in bytes written as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub plans: BTreeMap<String, Plan>,
    pub storage: BTreeMap<String, StorageOption>,
}

impl Default for Catalog {
    fn default() -> Self {
        let plans = [
            ("small", 10, 20, 500),
            ("medium", 20, 40, 900),
            ("large", 30, 50, 1500),
        ]
        .into_iter()
        .map(|(name, vcpus, memory_gb, price)| {
            (
                name.to_string(),
                Plan {
                    vcpus,
                    memory_gb,
                    price,
                },
            )
        })
        .collect();

        let storage = [
            ("1000000000000", "1 TB", 100),
            ("2000000000000", "2 TB", 190),
            ("3000000000000", "3 TB", 250),
        ]
        .into_iter()
        .map(|(bytes, display, price)| {
            (
                bytes.to_string(),
                StorageOption {
                    display: display.to_string(),
                    price,
                },
            )
        })
        .collect();

        Self { plans, storage }
    }
}

impl Catalog {
    pub fn from_toml_str(input: &str) -> CatalogResult<Self> {
        let catalog: Catalog = toml::from_str(input)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        info!(
            path = %path.display(),
            plans = catalog.plans.len(),
            storage_options = catalog.storage.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.plans.is_empty() || self.storage.is_empty() {
            return Err(CatalogError::Empty);
        }
        for key in self.storage.keys() {
            parse_bytes(key)?;
        }
        Ok(())
    }

    pub fn plan(&self, name: &str) -> CatalogResult<&Plan> {
        self.plans.get(name).ok_or_else(|| CatalogError::UnknownPlan {
            name: name.to_string(),
        })
    }

    pub fn storage(&self, bytes: &str) -> CatalogResult<&StorageOption> {
        self.storage
            .get(bytes)
            .ok_or_else(|| CatalogError::UnknownStorage {
                bytes: bytes.to_string(),
            })
    }

    /// Plans from cheapest to most expensive.
    pub fn plans_by_price(&self) -> Vec<(&str, &Plan)> {
        let mut plans: Vec<_> = self.plans.iter().map(|(k, v)| (k.as_str(), v)).collect();
        plans.sort_by_key(|(name, plan)| (plan.price, *name));
        plans
    }

    /// Storage options from smallest to largest.
    pub fn storage_by_size(&self) -> Vec<(&str, &StorageOption)> {
        let mut options: Vec<_> = self.storage.iter().map(|(k, v)| (k.as_str(), v)).collect();
        options.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
        options
    }

    /// Monthly price of a plan combined with a storage option.
    pub fn price(&self, plan: &str, storage_bytes: &str) -> CatalogResult<u32> {
        self.plan(plan)?
            .price
            .checked_add(self.storage(storage_bytes)?.price)
            .ok_or_else(|| CatalogError::PriceOverflow {
                plan: plan.to_string(),
                bytes: storage_bytes.to_string(),
            })
    }

    /// Quota limits a project on this plan and storage option receives.
    /// Memory is expressed in bytes, like storage.
    pub fn quotas_for(&self, plan: &str, storage_bytes: &str) -> CatalogResult<ProjectQuotaConfig> {
        let selected = self.plan(plan)?;
        self.storage(storage_bytes)?;
        let storage = parse_bytes(storage_bytes)?;

        Ok(ProjectQuotaConfig::new(
            i64::from(selected.vcpus),
            storage,
            i64::from(selected.memory_gb) * BYTES_PER_GB,
        ))
    }
}

fn parse_bytes(key: &str) -> CatalogResult<i64> {
    match key.parse::<i64>() {
        Ok(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(CatalogError::InvalidStorageKey {
            key: key.to_string(),
        }),
    }
}
