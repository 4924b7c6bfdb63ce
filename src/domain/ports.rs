use crate::domain::model::{ConfidenceLevel, SampleSizeRequest};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset};

/// Persists the single modification-time scalar between runs.
pub trait TimestampStore: Send + Sync {
    fn load(&self) -> Result<Option<f64>>;
    fn save(&self, modified: f64) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub trait ConfigProvider: Send + Sync {
    /// Resolved estimator inputs; fails when the z-score cannot be derived.
    fn request(&self) -> Result<SampleSizeRequest>;
    fn reader_name(&self) -> Option<&str>;
    fn source_path(&self) -> Option<&str>;
    fn sweep_margins(&self) -> &[f64];
    fn sweep_confidence_levels(&self) -> Result<Vec<ConfidenceLevel>>;
    fn timestamp_file(&self) -> &str;
    fn output_format(&self) -> &str;
    fn output_path(&self) -> Option<&str>;
}
