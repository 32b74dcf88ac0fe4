use declarations::{optional, ConfigError, ConfigResult, EnvSource};
use provisioner::ProvisionerSettings;
use std::path::PathBuf;

pub const PORT_VAR: &str = "PORT";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Everything the HTTP portal needs to start
#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub bind: String,
    pub port: u16,
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
    pub provisioner: ProvisionerSettings,
}

impl PortalSettings {
    pub fn new(provisioner: ProvisionerSettings) -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            views_dir: PathBuf::from("views"),
            public_dir: PathBuf::from("public"),
            provisioner,
        }
    }

    pub fn from_env(source: &dyn EnvSource) -> ConfigResult<Self> {
        Self::from_env_with_port(source, None)
    }

    /// Like [`PortalSettings::from_env`], but an explicit `port` wins and
    /// `PORT` is then never read.
    pub fn from_env_with_port(source: &dyn EnvSource, port: Option<u16>) -> ConfigResult<Self> {
        let provisioner = ProvisionerSettings::from_env(source)?;
        let port = match port {
            Some(port) => port,
            None => port_from_env(source)?,
        };

        Ok(Self::new(provisioner).with_port(port))
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_views_dir(mut self, views_dir: impl Into<PathBuf>) -> Self {
        self.views_dir = views_dir.into();
        self
    }

    pub fn with_public_dir(mut self, public_dir: impl Into<PathBuf>) -> Self {
        self.public_dir = public_dir.into();
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn port_from_env(source: &dyn EnvSource) -> ConfigResult<u16> {
    match optional(source, PORT_VAR) {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|source| ConfigError::InvalidInteger {
                name: PORT_VAR.to_string(),
                value: raw.clone(),
                source,
            }),
        None => Ok(DEFAULT_PORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarations::MapEnv;

    fn base_env() -> MapEnv {
        MapEnv::new()
            .with_var("NUTANIX_HOST", "prism")
            .with_var("NUTANIX_USER", "admin")
            .with_var("NUTANIX_PASSWORD", "pw")
    }

    #[test]
    fn test_default_port() {
        let settings = PortalSettings::from_env(&base_env()).unwrap();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.address(), "0.0.0.0:3000");
        assert_eq!(settings.views_dir, PathBuf::from("views"));
    }

    #[test]
    fn test_port_from_env() {
        let settings = PortalSettings::from_env(&base_env().with_var(PORT_VAR, "8080")).unwrap();
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        let err = PortalSettings::from_env(&base_env().with_var(PORT_VAR, "70000")).unwrap_err();
        assert_eq!(err.variable(), PORT_VAR);
    }

    #[test]
    fn test_explicit_port_skips_env() {
        let env = base_env().with_var(PORT_VAR, "not-a-port");
        let settings = PortalSettings::from_env_with_port(&env, Some(8080)).unwrap();
        assert_eq!(settings.port, 8080);

        let err = PortalSettings::from_env_with_port(&env, None).unwrap_err();
        assert_eq!(err.variable(), PORT_VAR);
    }

    #[test]
    fn test_missing_credentials_fail() {
        let err = PortalSettings::from_env(&MapEnv::new()).unwrap_err();
        assert_eq!(err.variable(), "NUTANIX_HOST");
    }
}
