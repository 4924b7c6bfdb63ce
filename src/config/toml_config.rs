use crate::config::{
    default_margin, default_proportion, resolve_levels, resolve_z, DEFAULT_OUTPUT_FORMAT,
    DEFAULT_TIMESTAMP_FILE,
};
use crate::core::{ConfigProvider, ConfidenceLevel, SampleSizeRequest};
use crate::utils::error::{Result, SurveyError};
use crate::utils::validation::{
    validate_output_format, validate_path, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub survey: SurveyConfig,
    pub report: Option<ReportConfig>,
    pub sweep: Option<SweepConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub population_size: Option<u64>,
    pub confidence_level: Option<f64>,
    pub z_score: Option<f64>,
    pub proportion: Option<f64>,
    pub margin_of_error: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub reader_name: Option<String>,
    pub source_path: Option<String>,
    pub timestamp_file: Option<String>,
    pub output_format: Option<String>,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub margins: Vec<f64>,
    #[serde(default)]
    pub confidence_levels: Vec<f64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SurveyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SurveyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VOTER_COUNT})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SurveyError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 命令列參數覆蓋檔案設定
    #[cfg(feature = "cli")]
    pub fn apply_cli_overrides(&mut self, cli: &crate::config::CliConfig) {
        let survey = &mut self.survey;
        if cli.infinite {
            survey.population_size = None;
        } else if cli.population.is_some() {
            survey.population_size = cli.population;
        }
        if cli.confidence.is_some() {
            survey.confidence_level = cli.confidence;
            // 指定信賴水準時，檔案中的 z 值不再適用
            survey.z_score = None;
        }
        if cli.z.is_some() {
            survey.z_score = cli.z;
        }
        if cli.proportion.is_some() {
            survey.proportion = cli.proportion;
        }
        if cli.margin.is_some() {
            survey.margin_of_error = cli.margin;
        }

        let report = self.report.get_or_insert_with(ReportConfig::default);
        if cli.name.is_some() {
            report.reader_name = cli.name.clone();
        }
        if cli.source.is_some() {
            report.source_path = cli.source.clone();
        }
        if cli.timestamp_file.is_some() {
            report.timestamp_file = cli.timestamp_file.clone();
        }
        if cli.format.is_some() {
            report.output_format = cli.format.clone();
        }
        if cli.output.is_some() {
            report.output_path = cli.output.clone();
        }

        if !cli.sweep_margins.is_empty() || !cli.sweep_confidence.is_empty() {
            let sweep = self.sweep.get_or_insert_with(SweepConfig::default);
            if !cli.sweep_margins.is_empty() {
                sweep.margins = cli.sweep_margins.clone();
            }
            if !cli.sweep_confidence.is_empty() {
                sweep.confidence_levels = cli.sweep_confidence.clone();
            }
        }
    }

    fn report_field<'a>(&'a self, pick: impl Fn(&'a ReportConfig) -> Option<&'a String>) -> Option<&'a str> {
        self.report.as_ref().and_then(pick).map(String::as_str)
    }
}

impl ConfigProvider for TomlConfig {
    fn request(&self) -> Result<SampleSizeRequest> {
        Ok(SampleSizeRequest {
            population_size: self.survey.population_size,
            confidence_z: resolve_z(self.survey.z_score, self.survey.confidence_level)?,
            proportion_p: default_proportion(self.survey.proportion),
            margin_of_error: default_margin(self.survey.margin_of_error),
        })
    }

    fn reader_name(&self) -> Option<&str> {
        self.report_field(|r| r.reader_name.as_ref())
    }

    fn source_path(&self) -> Option<&str> {
        self.report_field(|r| r.source_path.as_ref())
    }

    fn sweep_margins(&self) -> &[f64] {
        self.sweep.as_ref().map(|s| s.margins.as_slice()).unwrap_or(&[])
    }

    fn sweep_confidence_levels(&self) -> Result<Vec<ConfidenceLevel>> {
        let levels = self
            .sweep
            .as_ref()
            .map(|s| s.confidence_levels.as_slice())
            .unwrap_or(&[]);
        resolve_levels(levels, self.survey.confidence_level, self.survey.z_score)
    }

    fn timestamp_file(&self) -> &str {
        self.report_field(|r| r.timestamp_file.as_ref())
            .unwrap_or(DEFAULT_TIMESTAMP_FILE)
    }

    fn output_format(&self) -> &str {
        self.report_field(|r| r.output_format.as_ref())
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    fn output_path(&self) -> Option<&str> {
        self.report_field(|r| r.output_path.as_ref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.request()?.validate()?;
        validate_output_format("report.output_format", self.output_format())?;
        validate_path("report.timestamp_file", self.timestamp_file())?;
        if let Some(output) = self.output_path() {
            validate_path("report.output_path", output)?;
        }
        if let Some(source) = self.source_path() {
            validate_path("report.source_path", source)?;
        }
        Ok(())
    }
}
