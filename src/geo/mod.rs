//! Geo module - county boundaries and per-state map snapshots

mod loader;
mod snapshot;

pub use loader::{load_county_shapes, CountyGeometry};
pub use snapshot::{build_state_snapshot, StateSnapshot};
