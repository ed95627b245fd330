//! Port occupancy derivation and the queries answered from it.

pub mod checker;
pub mod index;
pub mod suggester;

pub use checker::{Availability, check};
pub use index::PortUsageIndex;
pub use suggester::{DEFAULT_START, MAX_PORT, MIN_SUGGESTED_PORT, Suggestion, suggest};
