use std::collections::HashSet;

use crate::types::Container;

/// Host ports bound by running containers at snapshot time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortUsageIndex {
    used: HashSet<u16>,
}

impl PortUsageIndex {
    /// Derive the index from an inventory snapshot.
    ///
    /// Only running containers contribute, and only through published
    /// mappings. Exposed-only ports never occupy a host port.
    pub fn build(containers: &[Container]) -> Self {
        let used = containers
            .iter()
            .filter(|container| container.is_running())
            .flat_map(|container| container.ports.iter())
            .filter(|mapping| mapping.is_published())
            .map(|mapping| mapping.public_port)
            .collect();

        Self { used }
    }

    /// Membership for any integer; values outside the 16-bit port space are
    /// never members.
    pub fn contains(&self, port: i64) -> bool {
        u16::try_from(port)
            .map(|port| self.used.contains(&port))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

impl FromIterator<u16> for PortUsageIndex {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self {
            used: iter.into_iter().filter(|port| *port != 0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerState, PortMapping, Protocol};
    use pretty_assertions::assert_eq;

    fn container(state: ContainerState, ports: Vec<PortMapping>) -> Container {
        Container {
            id: "id".to_string(),
            names: vec!["/test".to_string()],
            image: "image".to_string(),
            state,
            ports,
        }
    }

    #[test]
    fn test_only_running_containers_contribute() {
        let containers = vec![
            container(
                ContainerState::Running,
                vec![
                    PortMapping::new(80, 8080, Protocol::Tcp),
                    PortMapping::new(90, 9090, Protocol::Tcp),
                ],
            ),
            container(
                ContainerState::Exited,
                vec![PortMapping::new(3000, 3000, Protocol::Tcp)],
            ),
            container(
                ContainerState::Paused,
                vec![PortMapping::new(4000, 4000, Protocol::Tcp)],
            ),
        ];

        let index = PortUsageIndex::build(&containers);

        assert!(index.contains(8080));
        assert!(index.contains(9090));
        assert!(!index.contains(3000), "exited container must not occupy");
        assert!(!index.contains(4000), "paused container must not occupy");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_exposed_only_ports_never_occupy() {
        let containers = vec![container(
            ContainerState::Running,
            vec![
                PortMapping::new(5432, 0, Protocol::Tcp),
                PortMapping::new(53, 5353, Protocol::Udp),
            ],
        )];

        let index = PortUsageIndex::build(&containers);

        assert!(!index.contains(0));
        assert!(!index.contains(5432));
        assert!(index.contains(5353));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_out_of_range_values_are_never_members() {
        let index: PortUsageIndex = [8080u16].into_iter().collect();
        assert!(!index.contains(-8080));
        assert!(!index.contains(65536 + 8080));
        assert!(!index.contains(i64::MAX));
    }

    #[test]
    fn test_empty_inventory() {
        let index = PortUsageIndex::build(&[]);
        assert!(index.is_empty());
    }
}
