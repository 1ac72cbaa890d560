//! Data module - dataset download and reshape/merge

mod loader;
mod processor;

pub use loader::{download, fetch_csv, LoaderError};
pub use processor::melt_and_merge;
