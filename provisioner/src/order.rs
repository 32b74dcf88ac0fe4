use crate::catalog::{Catalog, CatalogResult};
use crate::error::ProvisionResult;
use crate::playbook::{PlaybookOutput, PlaybookRunner, ProjectVars};
use crate::settings::ProvisionerSettings;
use chrono::{DateTime, Utc};
use declarations::ProjectQuotaConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A customer's request for a new project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOrder {
    pub project_name: String,
    pub description: Option<String>,
    pub plan: String,
    pub storage_bytes: String,
}

impl ProjectOrder {
    pub fn new(
        project_name: impl Into<String>,
        plan: impl Into<String>,
        storage_bytes: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            description: None,
            plan: plan.into(),
            storage_bytes: storage_bytes.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub price: u32,
    pub quotas: ProjectQuotaConfig,
}

impl Catalog {
    pub fn quote(&self, order: &ProjectOrder) -> CatalogResult<Quote> {
        Ok(Quote {
            price: self.price(&order.plan, &order.storage_bytes)?,
            quotas: self.quotas_for(&order.plan, &order.storage_bytes)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReceipt {
    pub project_name: String,
    pub quote: Quote,
    pub output: PlaybookOutput,
    pub created_at: DateTime<Utc>,
}

/// Prices orders against the catalog and hands them to a playbook runner
#[derive(Clone)]
pub struct Provisioner {
    catalog: Arc<Catalog>,
    settings: Arc<ProvisionerSettings>,
    runner: Arc<dyn PlaybookRunner>,
}

impl Provisioner {
    pub fn new(
        catalog: Catalog,
        settings: ProvisionerSettings,
        runner: Arc<dyn PlaybookRunner>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            settings: Arc::new(settings),
            runner,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ProvisionerSettings {
        &self.settings
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    pub async fn provision(&self, order: &ProjectOrder) -> ProvisionResult<ProvisionReceipt> {
        let quote = self.catalog.quote(order)?;
        info!(
            project = %order.project_name,
            plan = %order.plan,
            storage_bytes = %order.storage_bytes,
            price = quote.price,
            "Provisioning project"
        );

        let vars = ProjectVars::new(
            &self.settings,
            order.project_name.clone(),
            order.description.clone(),
            &quote.quotas,
        );
        let output = self.runner.run(&vars).await?;

        Ok(ProvisionReceipt {
            project_name: order.project_name.clone(),
            quote,
            output,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::error::ProvisionError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        seen: Mutex<Vec<ProjectVars>>,
    }

    #[async_trait]
    impl PlaybookRunner for RecordingRunner {
        async fn run(&self, vars: &ProjectVars) -> ProvisionResult<PlaybookOutput> {
            self.seen.lock().unwrap().push(vars.clone());
            let now = Utc::now();
            Ok(PlaybookOutput {
                stdout: "ok".to_string(),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn provisioner(runner: Arc<RecordingRunner>) -> Provisioner {
        Provisioner::new(
            Catalog::default(),
            ProvisionerSettings::new("prism", "admin", "pw"),
            runner,
        )
    }

    #[test]
    fn test_quote() {
        let catalog = Catalog::default();
        let quote = catalog
            .quote(&ProjectOrder::new("acme", "large", "3000000000000"))
            .unwrap();
        assert_eq!(quote.price, 1750);
        assert_eq!(quote.quotas.vcpus, 30);
        assert_eq!(quote.quotas.memory, 50_000_000_000);
        assert_eq!(quote.quotas.storage, 3_000_000_000_000);
    }

    #[tokio::test]
    async fn test_provision_passes_vars_to_runner() {
        let runner = Arc::new(RecordingRunner::default());
        let provisioner = provisioner(runner.clone());

        let order =
            ProjectOrder::new("acme", "medium", "2000000000000").with_description("Acme dev");
        let receipt = provisioner.provision(&order).await.unwrap();

        assert_eq!(receipt.project_name, "acme");
        assert_eq!(receipt.quote.price, 1090);
        assert_eq!(receipt.output.stdout, "ok");

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].project_name, "acme");
        assert_eq!(seen[0].project_description.as_deref(), Some("Acme dev"));
        assert_eq!(seen[0].vcpus_limit, 20);
        assert_eq!(seen[0].memory_limit, 40_000_000_000);
        assert_eq!(seen[0].storage_limit, 2_000_000_000_000);
    }

    #[tokio::test]
    async fn test_invalid_order_never_reaches_runner() {
        let runner = Arc::new(RecordingRunner::default());
        let provisioner = provisioner(runner.clone());

        let result = provisioner
            .provision(&ProjectOrder::new("acme", "huge", "1000000000000"))
            .await;
        assert!(matches!(
            result,
            Err(ProvisionError::Catalog(CatalogError::UnknownPlan { .. }))
        ));
        assert!(runner.seen.lock().unwrap().is_empty());
        assert_eq!(provisioner.runner_name(), "recording");
    }
}
