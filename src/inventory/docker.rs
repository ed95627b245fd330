use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ContainerInventory;
use crate::classify::{ErrorCategory, category_for_message};
use crate::config::DockerConfig;
use crate::error::{ConfigError, InventoryError, Result};
use crate::types::{Container, ContainerState, PortMapping, Protocol};

/// Entry of `GET /containers/json`. Unlisted fields are ignored.
#[derive(Debug, Deserialize)]
struct DockerContainer {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Names", default)]
    names: Option<Vec<String>>,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Ports", default)]
    ports: Option<Vec<DockerPort>>,
}

#[derive(Debug, Deserialize)]
struct DockerPort {
    #[serde(rename = "IP", default)]
    ip: Option<String>,
    #[serde(rename = "PrivatePort")]
    private_port: u16,
    #[serde(rename = "PublicPort", default)]
    public_port: Option<u16>,
    #[serde(rename = "Type", default)]
    port_type: Protocol,
}

#[derive(Debug, Deserialize)]
struct DockerVersion {
    #[serde(rename = "Version", default)]
    version: String,
    #[serde(rename = "ApiVersion")]
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct DockerErrorBody {
    message: String,
}

impl From<DockerPort> for PortMapping {
    fn from(port: DockerPort) -> Self {
        let mapping = PortMapping::new(
            port.private_port,
            port.public_port.unwrap_or(0),
            port.port_type,
        );
        match port.ip {
            Some(ip) => mapping.with_host_ip(ip),
            None => mapping,
        }
    }
}

impl From<DockerContainer> for Container {
    fn from(container: DockerContainer) -> Self {
        Container {
            id: container.id,
            names: container.names.unwrap_or_default(),
            image: container.image,
            state: ContainerState::from(container.state),
            ports: container
                .ports
                .unwrap_or_default()
                .into_iter()
                .map(PortMapping::from)
                .collect(),
        }
    }
}

/// Docker Engine listing client, normally pointed at a read-only socket proxy
#[derive(Debug, Clone)]
pub struct DockerInventory {
    base_url: String,
    /// Path prefix such as `v1.43`; `None` means unversioned paths.
    api_version: Arc<RwLock<Option<String>>>,
    /// Ask the daemon for its version while none is known.
    negotiate: bool,
    client: reqwest::Client,
}

impl DockerInventory {
    /// Build a client without touching the network.
    pub fn new(config: &DockerConfig) -> Result<Self> {
        let base_url = endpoint_from_host(&config.host)?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("portscout/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout_ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(|e| ConfigError::InvalidDockerHost {
            host: config.host.clone(),
            reason: format!("failed to build HTTP client: {}", e),
        })?;

        let pinned = config.api_version.as_deref().map(normalize_api_version);
        Ok(Self {
            base_url,
            negotiate: pinned.is_none() && config.negotiate_version,
            api_version: Arc::new(RwLock::new(pinned)),
            client,
        })
    }

    /// Build a client and, unless a version is pinned, negotiate the API
    /// version. A failed negotiation is not fatal: requests go out
    /// unversioned and negotiation is tried again before the next fetch.
    pub async fn connect(config: &DockerConfig) -> Result<Self> {
        let inventory = Self::new(config)?;
        inventory.ensure_version().await;
        Ok(inventory)
    }

    pub async fn api_version(&self) -> Option<String> {
        self.api_version.read().await.clone()
    }

    /// Negotiate unless a version is already known. Returns the prefix to use.
    async fn ensure_version(&self) -> Option<String> {
        if let Some(version) = self.api_version.read().await.clone() {
            return Some(version);
        }
        if !self.negotiate {
            return None;
        }

        let mut slot = self.api_version.write().await;
        if slot.is_some() {
            return slot.clone();
        }
        match self.negotiate_version().await {
            Ok(version) => {
                info!(api_version = %version, "Negotiated Docker API version");
                *slot = Some(version);
            }
            Err(e) => {
                warn!(error = %e, "Docker API version negotiation failed, using unversioned paths");
            }
        }
        slot.clone()
    }

    async fn negotiate_version(&self) -> Result<String, InventoryError> {
        let url = format!("{}/version", self.base_url);
        debug!(%url, "Requesting Docker version");

        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        let response = check_status(response).await?;
        let version: DockerVersion = response.json().await.map_err(transport_error)?;

        debug!(server_version = %version.version, "Docker daemon reported version");
        Ok(normalize_api_version(&version.api_version))
    }

    fn url(&self, version: Option<&str>, path: &str) -> String {
        match version {
            Some(version) => format!("{}/{}{}", self.base_url, version, path),
            None => format!("{}{}", self.base_url, path),
        }
    }
}

#[async_trait]
impl ContainerInventory for DockerInventory {
    async fn fetch(&self) -> Result<Vec<Container>, InventoryError> {
        let version = self.ensure_version().await;
        let url = self.url(version.as_deref(), "/containers/json");
        debug!(%url, "Listing containers");

        let response = self
            .client
            .get(&url)
            .query(&[("all", "true")])
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let containers: Vec<DockerContainer> =
            response.json().await.map_err(transport_error)?;

        debug!(count = containers.len(), "Fetched container inventory");
        Ok(containers.into_iter().map(Container::from).collect())
    }
}

/// Turn a `DOCKER_HOST` value into an HTTP base URL without trailing slash.
pub fn endpoint_from_host(host: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDockerHost {
        host: host.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(invalid("host is empty"));
    }
    if trimmed.starts_with("unix://") || trimmed.starts_with("npipe://") {
        return Err(invalid(
            "local sockets are not supported, point DOCKER_HOST at the socket proxy (tcp://host:port)",
        ));
    }

    let candidate = if let Some(rest) = trimmed.strip_prefix("tcp://") {
        format!("http://{}", rest)
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be tcp, http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn normalize_api_version(version: &str) -> String {
    let version = version.trim();
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

/// Map a reqwest failure onto the typed channel.
fn transport_error(err: reqwest::Error) -> InventoryError {
    let message = error_chain(&err);
    if err.is_timeout() {
        InventoryError::Timeout { message }
    } else if err.is_connect() {
        InventoryError::Connectivity { message }
    } else {
        InventoryError::Other { message }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn check_status(response: Response) -> Result<Response, InventoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.map_err(|e| error_chain(&e));
    Err(status_error(status, error_detail(status, body)))
}

/// Failure text for a non-success response: the Docker `message` when the
/// body carries one, the raw body otherwise.
fn error_detail(status: StatusCode, body: Result<String, String>) -> String {
    let body = match body {
        Ok(body) => body,
        Err(read_error) => return format!("failed to read error body: {}", read_error),
    };

    let detail = serde_json::from_str::<DockerErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());
    if detail.is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_string()
    } else {
        detail
    }
}

fn status_error(status: StatusCode, detail: String) -> InventoryError {
    let message = format!("{} {}", status.as_u16(), detail);
    match status.as_u16() {
        401 | 403 => InventoryError::Permission { message },
        408 | 504 => InventoryError::Timeout { message },
        502 | 503 => InventoryError::Connectivity { message },
        _ if category_for_message(&detail) == ErrorCategory::ApiVersionMismatch => {
            InventoryError::VersionNegotiation { message }
        }
        _ => InventoryError::Other { message },
    }
}
