//! Report module - console output and interactive map

mod console;
mod map;

pub use console::print_summary;
pub use map::write_state_map;
