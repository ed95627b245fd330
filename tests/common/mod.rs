#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use portscout::{Container, ContainerInventory, ContainerState, InventoryError, PortMapping, Protocol};

/// Inventory that answers every fetch with the same snapshot or failure.
pub struct StaticInventory {
    result: Result<Vec<Container>, InventoryError>,
    calls: AtomicUsize,
}

impl StaticInventory {
    pub fn with_containers(containers: Vec<Container>) -> Self {
        Self {
            result: Ok(containers),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: InventoryError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerInventory for StaticInventory {
    async fn fetch(&self) -> Result<Vec<Container>, InventoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn container(id: &str, state: ContainerState, ports: Vec<PortMapping>) -> Container {
    Container {
        id: id.to_string(),
        names: vec![format!("/{}", id)],
        image: format!("{}:latest", id),
        state,
        ports,
    }
}

pub fn published(private_port: u16, public_port: u16) -> PortMapping {
    PortMapping::new(private_port, public_port, Protocol::Tcp)
}

pub fn exposed(private_port: u16) -> PortMapping {
    PortMapping::new(private_port, 0, Protocol::Tcp)
}
