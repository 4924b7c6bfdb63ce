use crate::core::{Clock, TimestampStore};
use crate::utils::error::{Result, SurveyError};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Korea Standard Time, UTC+09:00.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

pub fn kst() -> FixedOffset {
    // 常數偏移必定合法
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&kst())
    }
}

/// Sidecar file holding one float: seconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct FileTimestampStore {
    path: PathBuf,
}

impl FileTimestampStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimestampStore for FileTimestampStore {
    fn load(&self) -> Result<Option<f64>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SurveyError::IoError(e)),
        };

        let trimmed = content.trim();
        let value: f64 = trimmed.parse().map_err(|_| SurveyError::TimestampError {
            path: self.path.display().to_string(),
            message: format!("'{}' is not a number", trimmed),
        })?;

        if !value.is_finite() {
            return Err(SurveyError::TimestampError {
                path: self.path.display().to_string(),
                message: format!("'{}' is not a finite timestamp", trimmed),
            });
        }

        Ok(Some(value))
    }

    fn save(&self, modified: f64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, modified.to_string())?;
        Ok(())
    }
}
