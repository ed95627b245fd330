use std::sync::Arc;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::QueryError;
use crate::inventory::ContainerInventory;
use crate::ports::{self, Availability, DEFAULT_START, PortUsageIndex, Suggestion};
use crate::types::Container;

/// Runs the fetch, derive, answer pipeline for each query.
///
/// Holds no state besides the shared inventory handle; every call takes a
/// fresh snapshot.
#[derive(Clone)]
pub struct QueryService {
    inventory: Arc<dyn ContainerInventory>,
}

impl QueryService {
    pub fn new(inventory: Arc<dyn ContainerInventory>) -> Self {
        Self { inventory }
    }

    async fn snapshot(&self) -> Result<Vec<Container>, QueryError> {
        self.inventory.fetch().await.map_err(|err| {
            let classified = classify(&err);
            warn!(
                category = %classified.category,
                code = classified.code,
                error = %err,
                "Container inventory fetch failed"
            );
            QueryError::Upstream(classified)
        })
    }

    async fn index(&self) -> Result<PortUsageIndex, QueryError> {
        let containers = self.snapshot().await?;
        let index = PortUsageIndex::build(&containers);
        debug!(
            containers = containers.len(),
            used_ports = index.len(),
            "Built port usage index"
        );
        Ok(index)
    }

    /// All containers, any state, with their port mappings.
    pub async fn list_containers(&self) -> Result<Vec<Container>, QueryError> {
        self.snapshot().await
    }

    pub async fn check(&self, raw_port: Option<&str>) -> Result<Availability, QueryError> {
        let port = parse_port_param(raw_port)?;
        let index = self.index().await?;
        Ok(ports::check(&index, port))
    }

    pub async fn suggest(&self, raw_start: Option<&str>) -> Result<Suggestion, QueryError> {
        let start = parse_start_param(raw_start);
        let index = self.index().await?;
        Ok(ports::suggest(&index, start))
    }
}

/// Required integer `port` parameter. Any integer is accepted.
pub fn parse_port_param(raw: Option<&str>) -> Result<i64, QueryError> {
    match raw {
        None | Some("") => Err(QueryError::missing_param("port")),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| QueryError::invalid_param("port")),
    }
}

/// Optional `start` parameter; absent or unparsable falls back to 8000.
pub fn parse_start_param(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(DEFAULT_START)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorCategory;
    use crate::error::InventoryError;
    use crate::inventory::MockContainerInventory;
    use crate::types::{ContainerState, PortMapping, Protocol};
    use pretty_assertions::assert_eq;

    fn running(ports: &[u16]) -> Container {
        Container {
            id: "123".to_string(),
            names: vec!["/test1".to_string()],
            image: "image1".to_string(),
            state: ContainerState::Running,
            ports: ports
                .iter()
                .map(|port| PortMapping::new(80, *port, Protocol::Tcp))
                .collect(),
        }
    }

    fn service_with(containers: Vec<Container>) -> QueryService {
        let mut inventory = MockContainerInventory::new();
        inventory
            .expect_fetch()
            .times(1)
            .returning(move || Ok(containers.clone()));
        QueryService::new(Arc::new(inventory))
    }

    #[tokio::test]
    async fn test_check_reports_occupied_and_free_ports() {
        let service = service_with(vec![running(&[8080])]);
        assert!(!service.check(Some("8080")).await.unwrap().available);

        let service = service_with(vec![running(&[8080])]);
        assert!(service.check(Some("9000")).await.unwrap().available);
    }

    #[tokio::test]
    async fn test_suggest_skips_used_ports() {
        let service = service_with(vec![running(&[8000, 8001])]);
        let suggestion = service.suggest(Some("8000")).await.unwrap();
        assert_eq!(suggestion.port, Some(8002));
    }

    #[tokio::test]
    async fn test_suggest_defaults_when_start_is_garbage() {
        let service = service_with(vec![]);
        assert_eq!(service.suggest(Some("abc")).await.unwrap().port, Some(8000));

        let service = service_with(vec![]);
        assert_eq!(service.suggest(None).await.unwrap().port, Some(8000));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_inventory() {
        let mut inventory = MockContainerInventory::new();
        inventory.expect_fetch().never();
        let service = QueryService::new(Arc::new(inventory));

        let err = service.check(None).await.unwrap_err();
        assert_eq!(err, QueryError::missing_param("port"));

        let err = service.check(Some("eighty")).await.unwrap_err();
        assert_eq!(err, QueryError::invalid_param("port"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_classified_without_retry() {
        let mut inventory = MockContainerInventory::new();
        inventory.expect_fetch().times(1).returning(|| {
            Err(InventoryError::other(
                "Cannot connect: dial tcp 127.0.0.1:2375: connection refused",
            ))
        });
        let service = QueryService::new(Arc::new(inventory));

        match service.check(Some("8080")).await {
            Err(QueryError::Upstream(classified)) => {
                assert_eq!(classified.category, ErrorCategory::Unavailable);
                assert!(!classified.status().is_success());
            }
            other => panic!("expected upstream failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_listing_keeps_non_running_containers() {
        let mut exited = running(&[3000]);
        exited.state = ContainerState::Exited;
        let service = service_with(vec![running(&[8080]), exited]);

        let containers = service.list_containers().await.unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].state, ContainerState::Exited);
    }

    #[test]
    fn test_parse_port_param() {
        assert_eq!(parse_port_param(Some("8080")), Ok(8080));
        assert_eq!(parse_port_param(Some("-1")), Ok(-1));
        assert_eq!(parse_port_param(Some("+443")), Ok(443));
        assert_eq!(
            parse_port_param(Some("")),
            Err(QueryError::missing_param("port"))
        );
        assert_eq!(
            parse_port_param(Some("80.5")),
            Err(QueryError::invalid_param("port"))
        );
    }
}
