use serde::Serialize;

use super::PortUsageIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub port: i64,
    pub available: bool,
}

impl Availability {
    pub fn message(&self) -> &'static str {
        if self.available {
            "Port is available"
        } else {
            "Port is currently in use by a Docker container"
        }
    }
}

impl Serialize for Availability {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Availability", 3)?;
        state.serialize_field("port", &self.port)?;
        state.serialize_field("available", &self.available)?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

/// Whether `port` is free given the index. No range normalization happens
/// here: anything outside 0-65535 is simply never occupied.
pub fn check(index: &PortUsageIndex, port: i64) -> Availability {
    Availability {
        port,
        available: !index.contains(port),
    }
}
