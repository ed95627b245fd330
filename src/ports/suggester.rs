use serde::Serialize;

use super::PortUsageIndex;

/// Start hint used when the caller gives none, or gives garbage.
pub const DEFAULT_START: i64 = 8000;
/// Well-known ports below this are never suggested.
pub const MIN_SUGGESTED_PORT: i64 = 1024;
pub const MAX_PORT: i64 = 65535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    /// Normalized scan start.
    pub start: i64,
    pub port: Option<u16>,
}

impl Suggestion {
    pub fn found(&self) -> bool {
        self.port.is_some()
    }

    /// Wire value: the port, or -1 when nothing is free.
    pub fn port_or_sentinel(&self) -> i32 {
        self.port.map(i32::from).unwrap_or(-1)
    }

    pub fn message(&self) -> String {
        match self.port {
            Some(port) => format!("Suggested port: {}", port),
            None => "No free ports found in range".to_string(),
        }
    }
}

impl Serialize for Suggestion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Suggestion", 3)?;
        state.serialize_field("port", &self.port_or_sentinel())?;
        state.serialize_field("found", &self.found())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

/// First free port at or above `start`, clamped up to 1024, scanning in
/// ascending order through 65535.
pub fn suggest(index: &PortUsageIndex, start: i64) -> Suggestion {
    let start = start.max(MIN_SUGGESTED_PORT);
    let port = (start..=MAX_PORT)
        .find(|candidate| !index.contains(*candidate))
        .and_then(|candidate| u16::try_from(candidate).ok());

    Suggestion { start, port }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_skips_used_ports() {
        let index: PortUsageIndex = [8000u16, 8001].into_iter().collect();
        let suggestion = suggest(&index, 8000);
        assert_eq!(suggestion.port, Some(8002));
        assert_eq!(suggestion.message(), "Suggested port: 8002");
    }

    #[test]
    fn test_free_start_is_returned_as_is() {
        let index: PortUsageIndex = [8000u16, 8001].into_iter().collect();
        assert_eq!(suggest(&index, 9000).port, Some(9000));
    }

    #[test]
    fn test_privileged_start_is_clamped() {
        let index = PortUsageIndex::default();
        let suggestion = suggest(&index, 10);
        assert_eq!(suggestion.start, 1024);
        assert_eq!(suggestion.port, Some(1024));

        assert_eq!(suggest(&index, -500).port, Some(1024));
    }

    #[test]
    fn test_exhausted_range_yields_sentinel() {
        let index: PortUsageIndex = (65530u16..=65535).collect();
        let suggestion = suggest(&index, 65530);
        assert!(!suggestion.found());
        assert_eq!(suggestion.port_or_sentinel(), -1);
        assert_eq!(suggestion.message(), "No free ports found in range");
    }

    #[test]
    fn test_start_above_port_space_finds_nothing() {
        let index = PortUsageIndex::default();
        assert_eq!(suggest(&index, 70000).port, None);
    }

    #[test]
    fn test_last_port_is_suggestable() {
        let index: PortUsageIndex = (65000u16..65535).collect();
        assert_eq!(suggest(&index, 65000).port, Some(65535));
    }

    #[test]
    fn test_serialized_shape() {
        let index = PortUsageIndex::default();
        let value = serde_json::to_value(suggest(&index, 8000)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"port": 8000, "found": true, "message": "Suggested port: 8000"})
        );

        let index: PortUsageIndex = [65535u16].into_iter().collect();
        let value = serde_json::to_value(suggest(&index, 65535)).unwrap();
        assert_eq!(value["port"], -1);
        assert_eq!(value["found"], false);
    }
}
