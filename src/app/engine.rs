use crate::app::edit_tracker::EditTracker;
use crate::app::report::PollReport;
use crate::core::estimator::estimate;
use crate::core::sweep::sweep;
use crate::core::{Clock, ConfigProvider, TimestampStore};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::path::Path;

pub struct ReportEngine<S: TimestampStore, K: Clock> {
    tracker: EditTracker<S>,
    clock: K,
}

impl<S: TimestampStore, K: Clock> ReportEngine<S, K> {
    pub fn new(store: S, clock: K) -> Self {
        Self {
            tracker: EditTracker::new(store),
            clock,
        }
    }

    pub fn tracker(&self) -> &EditTracker<S> {
        &self.tracker
    }

    pub fn run<C: ConfigProvider>(&self, config: &C) -> Result<PollReport> {
        tracing::info!("Starting poll sample size report");

        let request = config.request()?;
        request.validate()?;
        tracing::debug!("Resolved request: {:?}", request);

        let result = estimate(&request)?;
        tracing::info!(
            "📐 Required sample size: {:.2} (reported {}, {:?} population)",
            result.required_n,
            result.reported_n(),
            result.method
        );

        let margins = config.sweep_margins();
        let rows = if margins.is_empty() {
            Vec::new()
        } else {
            let levels = config.sweep_confidence_levels()?;
            tracing::info!(
                "📊 Building sensitivity table: {} margins × {} confidence levels",
                margins.len(),
                levels.len()
            );
            sweep(&request, margins, &levels)?
        };

        let edit_status = match config.source_path() {
            Some(path) => Some(self.tracker.check(Path::new(path))?),
            None => None,
        };

        Ok(PollReport::new(request, result, self.clock.now())
            .with_edit_status(edit_status)
            .with_reader(config.reader_name())
            .with_sweep(rows))
    }
}
