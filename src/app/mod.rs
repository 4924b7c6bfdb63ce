// Presentation layer: report rendering and edit tracking around the pure estimator.

pub mod edit_tracker;
pub mod engine;
pub mod report;
