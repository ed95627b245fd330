use serde::{Deserialize, Serialize};
use serde::ser::{SerializeStruct, Serializer};
use std::fmt;

/// One runtime-managed container as seen in an inventory snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub state: ContainerState,
    pub ports: Vec<PortMapping>,
}

impl Container {
    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }
}

/// Container lifecycle state. Values the runtime reports that are not listed
/// here survive verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ContainerState {
    Running,
    Exited,
    Created,
    Paused,
    Restarting,
    Removing,
    Dead,
    Other(String),
}

impl ContainerState {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Exited => "exited",
            ContainerState::Created => "created",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Dead => "dead",
            ContainerState::Other(state) => state,
        }
    }
}

impl From<&str> for ContainerState {
    fn from(value: &str) -> Self {
        match value {
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            "created" => ContainerState::Created,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "dead" => ContainerState::Dead,
            other => ContainerState::Other(other.to_string()),
        }
    }
}

impl From<String> for ContainerState {
    fn from(value: String) -> Self {
        ContainerState::from(value.as_str())
    }
}

impl From<ContainerState> for String {
    fn from(state: ContainerState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
    #[serde(other)]
    Unknown,
}

/// One published or exposed container port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub private_port: u16,
    /// Host-side port; 0 means exposed only.
    pub public_port: u16,
    pub protocol: Protocol,
    pub host_ip: Option<String>,
}

impl PortMapping {
    pub fn new(private_port: u16, public_port: u16, protocol: Protocol) -> Self {
        Self {
            private_port,
            public_port,
            protocol,
            host_ip: None,
        }
    }

    pub fn with_host_ip(mut self, host_ip: impl Into<String>) -> Self {
        let host_ip = host_ip.into();
        self.host_ip = if host_ip.is_empty() { None } else { Some(host_ip) };
        self
    }

    pub fn is_published(&self) -> bool {
        self.public_port != 0
    }
}

/// `published` is written from `public_port` so a listing can never disagree
/// with the port index.
impl Serialize for PortMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.host_ip.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("PortMapping", fields)?;
        state.serialize_field("private_port", &self.private_port)?;
        state.serialize_field("public_port", &self.public_port)?;
        state.serialize_field("type", &self.protocol)?;
        if let Some(host_ip) = &self.host_ip {
            state.serialize_field("ip", host_ip)?;
        }
        state.serialize_field("published", &self.is_published())?;
        state.end()
    }
}
