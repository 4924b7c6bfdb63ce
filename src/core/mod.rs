pub mod estimator;
pub mod sweep;

pub use crate::domain::model::{
    ConfidenceLevel, EstimationMethod, SampleSizeRequest, SampleSizeResult, SweepRow,
};
pub use crate::domain::ports::{Clock, ConfigProvider, TimestampStore};
pub use crate::utils::error::Result;
