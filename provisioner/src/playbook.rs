//! Running the project creation playbook.
//!
//! Every run writes its variables to a uniquely named JSON file in the working
//! directory and passes it as `--extra-vars @file`. Ansible reads JSON vars
//! files the same way as YAML ones. The file is removed once the process has
//! exited, whatever the outcome.

use crate::error::{ProvisionError, ProvisionResult};
use crate::settings::ProvisionerSettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use declarations::ProjectQuotaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DEFAULT_PROGRAM: &str = "ansible-playbook";
pub const DEFAULT_PLAYBOOK: &str = "project_create.yaml";

/// Variables consumed by the project creation playbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectVars {
    pub nutanix_host: String,
    pub nutanix_username: String,
    pub nutanix_password: String,
    pub project_name: String,
    pub project_description: Option<String>,
    pub vcpus_limit: i64,
    pub memory_limit: i64,
    pub storage_limit: i64,
    pub subnet_name: String,
    pub account_name: String,
    pub directory_service_uuid: Option<String>,
}

impl ProjectVars {
    /// Memory and storage limits in `quotas` are byte counts.
    pub fn new(
        settings: &ProvisionerSettings,
        project_name: impl Into<String>,
        project_description: Option<String>,
        quotas: &ProjectQuotaConfig,
    ) -> Self {
        Self {
            nutanix_host: settings.nutanix_host.clone(),
            nutanix_username: settings.nutanix_user.clone(),
            nutanix_password: settings.nutanix_password.clone(),
            project_name: project_name.into(),
            project_description,
            vcpus_limit: quotas.vcpus,
            memory_limit: quotas.memory,
            storage_limit: quotas.storage,
            subnet_name: settings.subnet_name.clone(),
            account_name: settings.account_name.clone(),
            directory_service_uuid: settings.directory_service_uuid.clone(),
        }
    }
}

/// Captured result of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybookOutput {
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[async_trait]
pub trait PlaybookRunner: Send + Sync {
    async fn run(&self, vars: &ProjectVars) -> ProvisionResult<PlaybookOutput>;

    fn name(&self) -> &str;
}

/// Runs `ansible-playbook` as a child process
#[derive(Debug, Clone)]
pub struct AnsiblePlaybook {
    pub program: String,
    pub playbook: PathBuf,
    pub working_dir: PathBuf,
}

impl Default for AnsiblePlaybook {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            playbook: PathBuf::from(DEFAULT_PLAYBOOK),
            working_dir: PathBuf::from("."),
        }
    }
}

impl AnsiblePlaybook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_playbook(mut self, playbook: impl Into<PathBuf>) -> Self {
        self.playbook = playbook.into();
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    async fn execute(&self, vars_file: &str) -> ProvisionResult<PlaybookOutput> {
        let started_at = Utc::now();

        let mut child = Command::new(&self.program)
            .arg(&self.playbook)
            .arg("--extra-vars")
            .arg(format!("@{}", vars_file))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProvisionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout, stderr, status) = tokio::join!(
            collect_lines(stdout, false),
            collect_lines(stderr, true),
            child.wait()
        );
        let (stdout, stderr, status) = (stdout?, stderr?, status?);
        let finished_at = Utc::now();

        if status.success() {
            Ok(PlaybookOutput {
                stdout,
                stderr,
                started_at,
                finished_at,
            })
        } else {
            Err(ProvisionError::PlaybookFailed {
                code: status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[async_trait]
impl PlaybookRunner for AnsiblePlaybook {
    async fn run(&self, vars: &ProjectVars) -> ProvisionResult<PlaybookOutput> {
        let vars_file = format!("project_vars-{}.json", Uuid::new_v4());
        let vars_path = self.working_dir.join(&vars_file);

        tokio::fs::write(&vars_path, serde_json::to_vec_pretty(vars)?).await?;
        info!(
            project = %vars.project_name,
            playbook = %self.playbook.display(),
            "Running project playbook"
        );

        let result = self.execute(&vars_file).await;
        remove_vars_file(&vars_path).await;

        match &result {
            Ok(_) => info!(project = %vars.project_name, "Playbook finished"),
            Err(e) => error!(project = %vars.project_name, "Playbook failed: {}", e),
        }
        result
    }

    fn name(&self) -> &str {
        &self.program
    }
}

async fn remove_vars_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Error cleaning up vars file {}: {}", path.display(), e);
    }
}

async fn collect_lines<R>(pipe: Option<R>, is_stderr: bool) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let Some(pipe) = pipe else {
        return Ok(collected);
    };

    let mut lines = BufReader::new(pipe).lines();
    while let Some(line) = lines.next_line().await? {
        if is_stderr {
            warn!(target: "playbook", "{}", line);
        } else {
            info!(target: "playbook", "{}", line);
        }
        collected.push_str(&line);
        collected.push('\n');
    }
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProvisionerSettings {
        ProvisionerSettings::new("prism.local", "admin", "pw").with_directory_service_uuid("ds-1")
    }

    fn vars() -> ProjectVars {
        ProjectVars::new(
            &settings(),
            "acme",
            Some("Acme workloads".to_string()),
            &ProjectQuotaConfig::new(10, 1_000_000_000_000, 20_000_000_000),
        )
    }

    #[test]
    fn test_project_vars_mapping() {
        let vars = vars();
        assert_eq!(vars.nutanix_username, "admin");
        assert_eq!(vars.vcpus_limit, 10);
        assert_eq!(vars.memory_limit, 20_000_000_000);
        assert_eq!(vars.storage_limit, 1_000_000_000_000);
        assert_eq!(vars.subnet_name, "NTNX-IPAM");
        assert_eq!(vars.account_name, "NTNX_LOCAL_AZ");
        assert_eq!(vars.directory_service_uuid.as_deref(), Some("ds-1"));
    }

    #[test]
    fn test_project_vars_json_keys() {
        let value = serde_json::to_value(vars()).unwrap();
        for key in [
            "nutanix_host",
            "nutanix_username",
            "nutanix_password",
            "project_name",
            "project_description",
            "vcpus_limit",
            "memory_limit",
            "storage_limit",
            "subnet_name",
            "account_name",
            "directory_service_uuid",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_ansible_playbook_builder() {
        let runner = AnsiblePlaybook::new()
            .with_program("ansible-playbook-3")
            .with_playbook("create.yml")
            .with_working_dir("/srv/ansible");
        assert_eq!(runner.name(), "ansible-playbook-3");
        assert_eq!(runner.playbook, PathBuf::from("create.yml"));
        assert_eq!(runner.working_dir, PathBuf::from("/srv/ansible"));

        let default = AnsiblePlaybook::default();
        assert_eq!(default.program, "ansible-playbook");
        assert_eq!(default.playbook, PathBuf::from("project_create.yaml"));
    }

    fn leftover_vars_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("project_vars-"))
            .count()
    }

    // The "playbook" handed to `sh` is a script standing in for ansible.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_reads_vars_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("fake.sh"),
            "echo \"args: $1\"\ncat \"${2#@}\"\n",
        )
        .unwrap();

        let runner = AnsiblePlaybook::new()
            .with_program("sh")
            .with_playbook("fake.sh")
            .with_working_dir(dir.path());

        let output = runner.run(&vars()).await.unwrap();
        assert!(output.stdout.contains("args: --extra-vars"));
        assert!(output.stdout.contains("\"project_name\": \"acme\""));
        assert!(output.finished_at >= output.started_at);
        assert_eq!(leftover_vars_files(dir.path()), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_run_reports_stderr_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("fail.sh"),
            "echo partial\necho 'project exists' >&2\nexit 3\n",
        )
        .unwrap();

        let runner = AnsiblePlaybook::new()
            .with_program("sh")
            .with_playbook("fail.sh")
            .with_working_dir(dir.path());

        match runner.run(&vars()).await {
            Err(ProvisionError::PlaybookFailed {
                code,
                stdout,
                stderr,
            }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "project exists\n");
            }
            other => panic!("expected playbook failure, got {:?}", other),
        }
        assert_eq!(leftover_vars_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = AnsiblePlaybook::new()
            .with_program("definitely-not-an-ansible-binary")
            .with_working_dir(dir.path());

        let result = runner.run(&vars()).await;
        assert!(matches!(result, Err(ProvisionError::Spawn { .. })));
        assert_eq!(leftover_vars_files(dir.path()), 0);
    }
}
