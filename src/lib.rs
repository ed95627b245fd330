//! Portscout - which host ports are taken by containers, and which are free
//!
//! Every query takes a fresh inventory snapshot from the container runtime's
//! listing API (normally through a read-only socket proxy), derives the set of
//! host ports bound by running containers, and answers from that set:
//! list containers, check one port, or suggest the next free one.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod inventory;
pub mod monitoring;
pub mod ports;
pub mod service;
pub mod types;

pub use classify::{ClassifiedError, ErrorCategory, classify, classify_message};
pub use config::{ConfigOverrides, DockerConfig, PortscoutConfig, ServerConfig};
pub use error::{ConfigError, InventoryError, PortscoutError, QueryError, Result};
pub use inventory::{ContainerInventory, DockerInventory};
pub use ports::{Availability, PortUsageIndex, Suggestion};
pub use service::QueryService;
pub use types::{Container, ContainerState, PortMapping, Protocol};
