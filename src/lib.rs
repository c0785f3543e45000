pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod process;
pub mod query;
pub mod region;

pub use config::Config;
pub use dataset::{BuildReport, ObservationRow, UnifiedDataset};
pub use error::{IngestError, ValidationError};
pub use query::QueryEngine;
pub use region::{RegionDirectory, RegionName, TOTAL_REGIONS};
