use crate::core::TimestampStore;
use crate::domain::model::EditStatus;
use crate::utils::error::{Result, SurveyError};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Remembers a file's last modification time through a [`TimestampStore`].
pub struct EditTracker<S: TimestampStore> {
    store: S,
}

impl<S: TimestampStore> EditTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compares `modified` with the recorded value and records it.
    pub fn observe(&self, modified: f64) -> Result<EditStatus> {
        let status = match self.store.load()? {
            None => EditStatus::FirstSeen { modified },
            Some(previous) if previous == modified => EditStatus::Unchanged { modified },
            Some(previous) => EditStatus::Modified { previous, modified },
        };

        match status {
            EditStatus::Unchanged { .. } => {
                tracing::debug!("Source unchanged since last run ({})", modified);
            }
            EditStatus::FirstSeen { .. } => {
                tracing::info!("📝 Recording modification time for the first time");
                self.store.save(modified)?;
            }
            EditStatus::Modified { previous, .. } => {
                tracing::info!("📝 Source modified: {} -> {}", previous, modified);
                self.store.save(modified)?;
            }
        }

        Ok(status)
    }

    pub fn check(&self, path: &Path) -> Result<EditStatus> {
        let modified = file_modified_secs(path)?;
        self.observe(modified)
    }
}

/// Modification time of `path` in seconds since the Unix epoch.
pub fn file_modified_secs(path: &Path) -> Result<f64> {
    let modified = std::fs::metadata(path)?.modified()?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| SurveyError::TimestampError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(since_epoch.as_secs_f64())
}
