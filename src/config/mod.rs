pub mod cli;
pub mod toml_config;

use crate::domain::model::{ConfidenceLevel, DEFAULT_MARGIN_OF_ERROR, DEFAULT_PROPORTION};
use crate::utils::error::Result;

#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, SampleSizeRequest};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_output_format, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMESTAMP_FILE: &str = ".last_modified";
pub const DEFAULT_OUTPUT_FORMAT: &str = "text";

/// An explicit z-score wins; otherwise it is derived from the confidence
/// level (fraction or percentage, 95% when absent).
pub(crate) fn resolve_z(z_score: Option<f64>, confidence_level: Option<f64>) -> Result<f64> {
    match z_score {
        Some(z) => Ok(z),
        None => resolve_level(confidence_level)?.z_score(),
    }
}

pub(crate) fn resolve_level(confidence_level: Option<f64>) -> Result<ConfidenceLevel> {
    confidence_level
        .map(ConfidenceLevel::parse)
        .unwrap_or_else(|| Ok(ConfidenceLevel::default()))
}

/// Sweep levels fall back to the single configured level. With an explicit
/// z-score the list stays empty so the sweep reuses the request's z.
pub(crate) fn resolve_levels(
    levels: &[f64],
    confidence_level: Option<f64>,
    z_score: Option<f64>,
) -> Result<Vec<ConfidenceLevel>> {
    if !levels.is_empty() {
        return levels.iter().map(|&level| ConfidenceLevel::parse(level)).collect();
    }
    match z_score {
        Some(_) => Ok(Vec::new()),
        None => Ok(vec![resolve_level(confidence_level)?]),
    }
}

pub(crate) fn default_proportion(proportion: Option<f64>) -> f64 {
    proportion.unwrap_or(DEFAULT_PROPORTION)
}

pub(crate) fn default_margin(margin: Option<f64>) -> f64 {
    margin.unwrap_or(DEFAULT_MARGIN_OF_ERROR)
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "poll-sample-size")]
#[command(about = "Required sample size for an election poll, with finite-population correction")]
pub struct CliConfig {
    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Population size N (e.g. number of eligible voters)
    #[arg(short = 'N', long)]
    pub population: Option<u64>,

    /// Ignore any population size and use the infinite-population formula
    #[arg(long)]
    pub infinite: bool,

    /// Confidence level as a fraction (0.95) or percentage (95)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Explicit z-score; overrides --confidence
    #[arg(short, long)]
    pub z: Option<f64>,

    /// Assumed proportion p [default: 0.5]
    #[arg(short, long)]
    pub proportion: Option<f64>,

    /// Margin of error B [default: 0.05]
    #[arg(short, long)]
    pub margin: Option<f64>,

    /// Margins of error for the sensitivity table
    #[arg(long, value_delimiter = ',')]
    pub sweep_margins: Vec<f64>,

    /// Confidence levels for the sensitivity table
    #[arg(long, value_delimiter = ',')]
    pub sweep_confidence: Vec<f64>,

    /// Reader name for the greeting
    #[arg(long)]
    pub name: Option<String>,

    /// File whose modification time is tracked
    #[arg(long)]
    pub source: Option<String>,

    /// Sidecar file storing the last seen modification time [default: .last_modified]
    #[arg(long)]
    pub timestamp_file: Option<String>,

    /// Output format: text, json or csv [default: text]
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn request(&self) -> Result<SampleSizeRequest> {
        Ok(SampleSizeRequest {
            population_size: if self.infinite { None } else { self.population },
            confidence_z: resolve_z(self.z, self.confidence)?,
            proportion_p: default_proportion(self.proportion),
            margin_of_error: default_margin(self.margin),
        })
    }

    fn reader_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn source_path(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn sweep_margins(&self) -> &[f64] {
        &self.sweep_margins
    }

    fn sweep_confidence_levels(&self) -> Result<Vec<ConfidenceLevel>> {
        resolve_levels(&self.sweep_confidence, self.confidence, self.z)
    }

    fn timestamp_file(&self) -> &str {
        self.timestamp_file.as_deref().unwrap_or(DEFAULT_TIMESTAMP_FILE)
    }

    fn output_format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.request()?.validate()?;
        validate_output_format("format", self.output_format())?;
        validate_path("timestamp_file", self.timestamp_file())?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        if let Some(source) = &self.source {
            validate_path("source", source)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["poll-sample-size"]);
        let request = config.request().unwrap();
        assert_eq!(request.population_size, None);
        assert!((request.confidence_z - 1.959964).abs() < 1e-5);
        assert_eq!(request.proportion_p, 0.5);
        assert_eq!(request.margin_of_error, 0.05);
        assert_eq!(config.timestamp_file(), DEFAULT_TIMESTAMP_FILE);
        assert_eq!(config.output_format(), DEFAULT_OUTPUT_FORMAT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_flags() {
        let config = CliConfig::parse_from([
            "poll-sample-size",
            "--population",
            "44391871",
            "--confidence",
            "99",
            "--margin",
            "0.031",
            "--sweep-margins",
            "0.02,0.03",
            "--format",
            "json",
        ]);
        let request = config.request().unwrap();
        assert_eq!(request.population_size, Some(44_391_871));
        assert!((request.confidence_z - 2.575829).abs() < 1e-5);
        assert_eq!(config.sweep_margins(), &[0.02, 0.03]);
        assert_eq!(config.sweep_confidence_levels().unwrap().len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_z_and_infinite_flag() {
        let config = CliConfig::parse_from([
            "poll-sample-size",
            "-N",
            "1000",
            "--infinite",
            "--z",
            "1.96",
            "--confidence",
            "90",
        ]);
        let request = config.request().unwrap();
        assert_eq!(request.population_size, None);
        assert_eq!(request.confidence_z, 1.96);
    }

    #[test]
    fn test_explicit_z_sweeps_with_request_z() {
        let config = CliConfig::parse_from([
            "poll-sample-size",
            "--z",
            "2.576",
            "--confidence",
            "95",
            "--sweep-margins",
            "0.05",
        ]);
        assert!(config.sweep_confidence_levels().unwrap().is_empty());

        let with_levels = CliConfig::parse_from([
            "poll-sample-size",
            "--z",
            "2.576",
            "--sweep-confidence",
            "90,99",
        ]);
        assert_eq!(with_levels.sweep_confidence_levels().unwrap().len(), 2);
    }

    #[test]
    fn test_cli_validation_errors() {
        let zero_margin = CliConfig::parse_from(["poll-sample-size", "--margin", "0"]);
        assert_eq!(
            zero_margin.validate().unwrap_err().field(),
            Some("margin_of_error")
        );

        let bad_format = CliConfig::parse_from(["poll-sample-size", "--format", "html"]);
        assert_eq!(bad_format.validate().unwrap_err().field(), Some("format"));
    }
}
