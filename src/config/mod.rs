use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::inventory::docker::endpoint_from_host;
use crate::monitoring::TracingConfig;

pub const CONFIG_FILE_NAME: &str = "portscout.toml";

/// Full process configuration: defaults, then the TOML file, then CLI/env.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PortscoutConfig {
    pub server: ServerConfig,
    pub docker: DockerConfig,
    pub logging: TracingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for `GET /` and other non-API paths.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DockerConfig {
    /// `tcp://`, `http://` or `https://` address of the read-only proxy.
    pub host: String,
    /// Pinned API version such as `1.43`; skips negotiation.
    pub api_version: Option<String>,
    pub negotiate_version: bool,
    /// Unset means requests only end when the daemon answers or the caller
    /// goes away.
    pub request_timeout_ms: Option<u64>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            host: "tcp://localhost:2375".to_string(),
            api_version: None,
            negotiate_version: true,
            request_timeout_ms: None,
        }
    }
}

/// Values from flags or environment that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub docker_host: Option<String>,
    pub docker_api_version: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl PortscoutConfig {
    /// Load configuration from an explicit file, or from the default
    /// location when it exists, or fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(path)? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// The file `load` would read. An explicit path must exist.
    pub fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>> {
        match path {
            Some(path) if !path.exists() => Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into()),
            Some(path) => Ok(Some(path.to_path_buf())),
            None => Ok(default_config_path().filter(|path| path.exists())),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PortscoutConfig =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                reason: e.to_string(),
            })?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.server.static_dir = Some(static_dir);
        }
        if let Some(docker_host) = overrides.docker_host {
            self.docker.host = docker_host;
        }
        if let Some(api_version) = overrides.docker_api_version {
            self.docker.api_version = Some(api_version);
        }
        if let Some(level) = overrides.log_level {
            self.logging.log_level = level;
        }
        if overrides.log_json {
            self.logging.enable_json_logs = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        endpoint_from_host(&self.docker.host)?;

        if let Some(dir) = &self.server.static_dir {
            if !dir.is_dir() {
                return Err(ConfigError::InvalidFormat {
                    reason: format!("static_dir {} is not a directory", dir.display()),
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let address = format!("{}:{}", self.server.host, self.server.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddress { address }.into())
    }
}

/// `$XDG_CONFIG_HOME/portscout/portscout.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("portscout").join(CONFIG_FILE_NAME))
}
