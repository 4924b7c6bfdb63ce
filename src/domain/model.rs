use crate::utils::error::{Result, SurveyError};
use crate::utils::validation::{
    validate_half_open, validate_population, validate_positive, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

pub const DEFAULT_PROPORTION: f64 = 0.5;
pub const DEFAULT_MARGIN_OF_ERROR: f64 = 0.05;

/// Inputs for one sample-size computation.
///
/// `population_size == None` selects the infinite-population approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeRequest {
    pub population_size: Option<u64>,
    pub confidence_z: f64,
    pub proportion_p: f64,
    pub margin_of_error: f64,
}

impl SampleSizeRequest {
    pub fn new(confidence_z: f64, proportion_p: f64, margin_of_error: f64) -> Self {
        Self {
            population_size: None,
            confidence_z,
            proportion_p,
            margin_of_error,
        }
    }

    pub fn with_population(mut self, population_size: u64) -> Self {
        self.population_size = Some(population_size);
        self
    }

    pub fn proportion_q(&self) -> f64 {
        1.0 - self.proportion_p
    }
}

impl Validate for SampleSizeRequest {
    fn validate(&self) -> Result<()> {
        if let Some(population) = self.population_size {
            validate_population("population_size", population)?;
        }
        validate_positive("confidence_z", self.confidence_z)?;
        validate_range("proportion_p", self.proportion_p, 0.0, 1.0)?;
        validate_half_open("margin_of_error", self.margin_of_error, 1.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    Infinite,
    Finite,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeResult {
    pub required_n: f64,
    pub proportion_q: f64,
    pub method: EstimationMethod,
}

impl SampleSizeResult {
    /// Sample size as it is reported: rounded up to the next whole respondent.
    pub fn reported_n(&self) -> u64 {
        self.required_n.ceil() as u64
    }
}

/// Two-sided confidence level expressed as a fraction, e.g. `0.95`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    pub fn from_fraction(value: f64) -> Result<Self> {
        validate_range("confidence_level", value, 0.0, 1.0)?;
        if value == 0.0 || value == 1.0 {
            return Err(SurveyError::invalid_parameter(
                "confidence_level",
                value,
                "Confidence level must be strictly between 0 and 1",
            ));
        }
        Ok(Self(value))
    }

    pub fn from_percent(value: f64) -> Result<Self> {
        Self::from_fraction(value / 100.0).map_err(|_| {
            SurveyError::invalid_parameter(
                "confidence_level",
                value,
                "Confidence percentage must be strictly between 0 and 100",
            )
        })
    }

    /// Accepts either a fraction (`0.95`) or a percentage (`95`).
    pub fn parse(value: f64) -> Result<Self> {
        if value > 1.0 {
            Self::from_percent(value)
        } else {
            Self::from_fraction(value)
        }
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }

    /// Standard-normal quantile for this two-sided level (0.95 → ≈1.96).
    pub fn z_score(&self) -> Result<f64> {
        let normal = standard_normal("confidence_level", self.0)?;
        let alpha = 1.0 - self.0;
        Ok(normal.inverse_cdf(1.0 - alpha / 2.0))
    }

    /// Two-sided coverage of an explicit z-score (1.96 → ≈0.95).
    pub fn fraction_for_z(z: f64) -> Result<f64> {
        validate_positive("confidence_z", z)?;
        let normal = standard_normal("confidence_z", z)?;
        Ok(2.0 * normal.cdf(z) - 1.0)
    }
}

fn standard_normal(field: &str, value: f64) -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| SurveyError::invalid_parameter(field, value, e.to_string()))
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(0.95)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub confidence_level: f64,
    pub z: f64,
    pub margin_of_error: f64,
    pub required_n: f64,
    pub reported_n: u64,
}

/// Outcome of comparing a source file's modification time with the recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditStatus {
    FirstSeen { modified: f64 },
    Unchanged { modified: f64 },
    Modified { previous: f64, modified: f64 },
}

impl EditStatus {
    pub fn modified(&self) -> f64 {
        match *self {
            EditStatus::FirstSeen { modified }
            | EditStatus::Unchanged { modified }
            | EditStatus::Modified { modified, .. } => modified,
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, EditStatus::Modified { .. })
    }
}
