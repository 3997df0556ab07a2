//! Survey mapper: CSV in, heatmap, display map and KMZ overlay out.

pub mod config;
pub mod ingest;
pub mod pipeline;

pub use config::MapperConfig;
pub use pipeline::{run, RunSummary};
