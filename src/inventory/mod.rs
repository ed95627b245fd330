//! Container inventory: the only part of the crate that talks to the runtime.

pub mod docker;

use async_trait::async_trait;

use crate::error::InventoryError;
use crate::types::Container;

pub use docker::DockerInventory;

/// Source of inventory snapshots.
///
/// Implementations must list every container regardless of state; state
/// filtering happens in the port index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerInventory: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Container>, InventoryError>;
}
