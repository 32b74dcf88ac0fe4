use declarations::{optional, require, var_or, ConfigResult, EnvSource};
use serde::Serialize;
use std::fmt;

pub const NUTANIX_HOST_VAR: &str = "NUTANIX_HOST";
pub const NUTANIX_USER_VAR: &str = "NUTANIX_USER";
pub const NUTANIX_PASSWORD_VAR: &str = "NUTANIX_PASSWORD";
pub const SUBNET_NAME_VAR: &str = "SUBNET_NAME";
pub const ACCOUNT_NAME_VAR: &str = "ACCOUNT_NAME";
pub const DIRECTORY_SERVICE_UUID_VAR: &str = "DIRECTORY_SERVICE_UUID";

pub const DEFAULT_SUBNET_NAME: &str = "NTNX-IPAM";
pub const DEFAULT_ACCOUNT_NAME: &str = "NTNX_LOCAL_AZ";

/// Connection and placement settings passed to every playbook run
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionerSettings {
    pub nutanix_host: String,
    pub nutanix_user: String,
    #[serde(skip_serializing)]
    pub nutanix_password: String,
    pub subnet_name: String,
    pub account_name: String,
    pub directory_service_uuid: Option<String>,
}

impl ProvisionerSettings {
    pub fn new(
        nutanix_host: impl Into<String>,
        nutanix_user: impl Into<String>,
        nutanix_password: impl Into<String>,
    ) -> Self {
        Self {
            nutanix_host: nutanix_host.into(),
            nutanix_user: nutanix_user.into(),
            nutanix_password: nutanix_password.into(),
            subnet_name: DEFAULT_SUBNET_NAME.to_string(),
            account_name: DEFAULT_ACCOUNT_NAME.to_string(),
            directory_service_uuid: None,
        }
    }

    pub fn from_env(source: &dyn EnvSource) -> ConfigResult<Self> {
        Ok(Self {
            nutanix_host: require(source, NUTANIX_HOST_VAR)?,
            nutanix_user: require(source, NUTANIX_USER_VAR)?,
            nutanix_password: require(source, NUTANIX_PASSWORD_VAR)?,
            subnet_name: var_or(source, SUBNET_NAME_VAR, DEFAULT_SUBNET_NAME),
            account_name: var_or(source, ACCOUNT_NAME_VAR, DEFAULT_ACCOUNT_NAME),
            directory_service_uuid: optional(source, DIRECTORY_SERVICE_UUID_VAR),
        })
    }

    pub fn with_subnet_name(mut self, subnet_name: impl Into<String>) -> Self {
        self.subnet_name = subnet_name.into();
        self
    }

    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = account_name.into();
        self
    }

    pub fn with_directory_service_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.directory_service_uuid = Some(uuid.into());
        self
    }
}

impl fmt::Debug for ProvisionerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionerSettings")
            .field("nutanix_host", &self.nutanix_host)
            .field("nutanix_user", &self.nutanix_user)
            .field("nutanix_password", &"<redacted>")
            .field("subnet_name", &self.subnet_name)
            .field("account_name", &self.account_name)
            .field("directory_service_uuid", &self.directory_service_uuid)
            .finish()
    }
}
