pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{edit_tracker::EditTracker, engine::ReportEngine, report::PollReport};
pub use config::cli::{FileTimestampStore, SystemClock};
pub use config::toml_config::TomlConfig;
pub use crate::core::estimator::{estimate, estimate_finite, estimate_infinite};
pub use domain::model::{
    ConfidenceLevel, EditStatus, EstimationMethod, SampleSizeRequest, SampleSizeResult, SweepRow,
};
pub use utils::error::{Result, SurveyError};
