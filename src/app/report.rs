//! Korean-language poll report built around one estimator result.

use crate::core::sweep::{row_for, rows_to_csv};
use crate::core::{EstimationMethod, SampleSizeRequest, SampleSizeResult, SweepRow};
use crate::domain::model::EditStatus;
use crate::utils::error::{Result, SurveyError};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::fmt;

/// Registered voters for the 21st presidential election (announced 2 June 2025).
pub const REGISTERED_VOTERS_21ST: u64 = 44_391_871;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S (UTC%:z)";

#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub request: SampleSizeRequest,
    pub result: SampleSizeResult,
    pub reported_n: u64,
    pub rendered_at: DateTime<FixedOffset>,
    pub edit_status: Option<EditStatus>,
    pub reader_name: Option<String>,
    pub sweep: Vec<SweepRow>,
}

impl PollReport {
    pub fn new(
        request: SampleSizeRequest,
        result: SampleSizeResult,
        rendered_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            request,
            result,
            reported_n: result.reported_n(),
            rendered_at,
            edit_status: None,
            reader_name: None,
            sweep: Vec::new(),
        }
    }

    pub fn with_edit_status(mut self, status: Option<EditStatus>) -> Self {
        self.edit_status = status;
        self
    }

    /// Blank names are dropped.
    pub fn with_reader(mut self, name: Option<&str>) -> Self {
        self.reader_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_sweep(mut self, rows: Vec<SweepRow>) -> Self {
        self.sweep = rows;
        self
    }

    /// Source modification time in the report's offset, or the render time
    /// when nothing is tracked.
    pub fn last_edited(&self) -> DateTime<FixedOffset> {
        self.edit_status
            .and_then(|status| {
                let secs = status.modified();
                DateTime::<Utc>::from_timestamp(secs.trunc() as i64, (secs.fract() * 1e9) as u32)
            })
            .map(|utc| utc.with_timezone(self.rendered_at.offset()))
            .unwrap_or(self.rendered_at)
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Headline request first, then the sweep rows.
    pub fn to_csv(&self) -> Result<String> {
        let mut rows = Vec::with_capacity(self.sweep.len() + 1);
        rows.push(row_for(&self.request)?);
        rows.extend_from_slice(&self.sweep);
        rows_to_csv(&rows)
    }

    pub fn render(&self, format: &str) -> Result<String> {
        match format {
            "text" => Ok(self.render_text()),
            "json" => self.to_json(),
            "csv" => self.to_csv(),
            other => Err(SurveyError::ConfigValidationError {
                field: "format".to_string(),
                message: format!("Unsupported format '{}'", other),
            }),
        }
    }

    fn write_formula(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result.method {
            EstimationMethod::Finite => writeln!(
                f,
                "모집단의 크기 N을 알고 있으므로 필요한 표본 크기 n은 \
                 n = N·z²·p·q / ((N−1)·B² + z²·p·q) 로 계산합니다 (유한모집단 수정). \
                 N이 매우 크면 이 값은 n = z²·p·q / B² 에 수렴합니다."
            )?,
            EstimationMethod::Infinite => writeln!(
                f,
                "모집단의 크기가 매우 크다고 보고 필요한 표본 크기 n은 \
                 n = z²·p·q / B² 로 계산합니다."
            )?,
        }
        writeln!(f)?;
        writeln!(
            f,
            "여기서 z는 신뢰수준에 해당하는 z값 (예: 95% → z≈1.96)이고, \
             p는 특성의 비율 (보통 보수적으로 0.5 사용), q는 1−p, \
             B는 허용오차 (margin of error, 예: 0.05 = ±5%) 를 나타냅니다."
        )
    }

    fn write_result(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = &self.request;
        match request.population_size {
            Some(population) => writeln!(f, "- N = {}", group_thousands(population))?,
            None => writeln!(f, "- N = ∞")?,
        }
        writeln!(f, "- z = {:.4}", request.confidence_z)?;
        writeln!(
            f,
            "- p = {}, q = {}",
            request.proportion_p, self.result.proportion_q
        )?;
        writeln!(f, "- B = {}", request.margin_of_error)?;
        writeln!(f)?;
        writeln!(
            f,
            "**필요한 표본 수: n ≈ {:.2} → {}명**",
            self.result.required_n,
            group_thousands(self.reported_n)
        )
    }

    fn write_sweep(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### 허용오차·신뢰수준별 표본 수")?;
        writeln!(f)?;
        writeln!(f, "| 신뢰수준 | z | 허용오차 | n |")?;
        writeln!(f, "|---|---|---|---|")?;
        for row in &self.sweep {
            writeln!(
                f,
                "| {}% | {:.3} | ±{}% | {} |",
                as_percent(row.confidence_level),
                row.z,
                as_percent(row.margin_of_error),
                group_thousands(row.reported_n)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for PollReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# 안녕하세요👋 이 글은 {}에 마지막으로 편집되었습니다!",
            self.last_edited().format(TIME_FORMAT)
        )?;
        match self.edit_status {
            Some(EditStatus::Modified { .. }) => {
                writeln!(f, "> 지난번 확인 이후 글이 수정되었습니다.")?
            }
            Some(EditStatus::FirstSeen { .. }) => {
                writeln!(f, "> 수정 시각을 처음으로 기록했습니다.")?
            }
            Some(EditStatus::Unchanged { .. }) | None => {}
        }
        writeln!(f)?;
        writeln!(
            f,
            "## 이것은 여론조사 결과로 2025년 21대 대통령 선거를 예측해보는 글입니다."
        )?;
        writeln!(f)?;

        if let Some(name) = &self.reader_name {
            writeln!(f, "{}님, 반가워요!", name)?;
            writeln!(f)?;
        }

        writeln!(
            f,
            "6월 2일 중앙선거관리위원회에 따르면 21대 대선 유권자 수는 **{}명**입니다. \
             이것은 역대 최대 규모입니다. 인구는 줄고 있지만 고령화 추세로 성인 유권자가 늘었습니다.",
            group_thousands(REGISTERED_VOTERS_21ST)
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "여론조사결과는 중앙선거관리위원회의 중앙선거여론조사심의위원회 홈페이지에서 발췌했습니다. \
             대부분의 여론조사는 무선전화면접 또는 무선ARS로 진행했으며 표본추출 방식은 성, 연령, 지역 할당 후 \
             무선 가상번호를 추출했습니다. 사후층화로 성별, 연령별, 지역별 가중값을 부여했으니 \
             Simple Random Sampling(단순임의추출)을 Without replacement(비복원추출)한 것으로 보고 추정량을 사용하겠습니다."
        )?;
        writeln!(f)?;
        writeln!(f, "## 🧐우리에게 필요한 표본 수는 얼마일까?")?;
        writeln!(f)?;
        self.write_formula(f)?;
        writeln!(f)?;
        self.write_result(f)?;

        if !self.sweep.is_empty() {
            writeln!(f)?;
            self.write_sweep(f)?;
        }

        writeln!(f)?;
        write!(
            f,
            "_{} 기준으로 계산했습니다._",
            self.rendered_at.format(TIME_FORMAT)
        )
    }
}

fn as_percent(fraction: f64) -> f64 {
    (fraction * 1e6).round() / 1e4
}

/// `44391871` → `44,391,871`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimator::estimate;
    use chrono::TimeZone;

    fn rendered_at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 3, 9, 0, 0)
            .unwrap()
    }

    fn election_report() -> PollReport {
        let request = SampleSizeRequest::new(1.96, 0.5, 0.031).with_population(REGISTERED_VOTERS_21ST);
        let result = estimate(&request).unwrap();
        PollReport::new(request, result, rendered_at())
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(44_391_871), "44,391,871");
    }

    #[test]
    fn test_text_shows_computed_value() {
        let text = election_report().render_text();
        assert!(text.contains("44,391,871명"));
        assert!(text.contains("n = N·z²·p·q / ((N−1)·B² + z²·p·q)"));
        assert!(text.contains("→ 1,000명"));
        assert!(!text.contains("100,000"));
        assert!(text.contains("2025-06-03 09:00:00 (UTC+09:00)에 마지막으로 편집"));
    }

    #[test]
    fn test_greeting_and_blank_name() {
        let text = election_report().with_reader(Some("지민")).render_text();
        assert!(text.contains("지민님, 반가워요!"));

        let report = election_report().with_reader(Some("   "));
        assert!(report.reader_name.is_none());
        assert!(!report.render_text().contains("반가워요"));
    }

    #[test]
    fn test_last_edited_uses_edit_status() {
        // 2025-06-01 00:00:00 UTC
        let report = election_report()
            .with_edit_status(Some(EditStatus::Modified {
                previous: 1_748_700_000.0,
                modified: 1_748_736_000.0,
            }));
        let edited = report.last_edited();
        assert_eq!(edited.format("%Y-%m-%d %H:%M").to_string(), "2025-06-01 09:00");
        assert!(report.render_text().contains("수정되었습니다"));
    }

    #[test]
    fn test_infinite_formula_text() {
        let request = SampleSizeRequest::new(1.96, 0.5, 0.05);
        let result = estimate(&request).unwrap();
        let text = PollReport::new(request, result, rendered_at()).render_text();
        assert!(text.contains("n = z²·p·q / B² 로 계산합니다"));
        assert!(text.contains("- N = ∞"));
        assert!(text.contains("n ≈ 384.16 → 385명"));
    }

    #[test]
    fn test_json_and_unknown_format() {
        let report = election_report();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["reported_n"], 1000);
        assert_eq!(json["result"]["method"], "finite");
        assert_eq!(json["request"]["population_size"], 44_391_871);

        let err = report.render("html").unwrap_err();
        assert_eq!(err.field(), Some("format"));
    }

    #[test]
    fn test_csv_without_sweep_has_headline_row() {
        let request = SampleSizeRequest::new(1.96, 0.5, 0.05);
        let result = estimate(&request).unwrap();
        let csv = PollReport::new(request, result, rendered_at())
            .render("csv")
            .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("0.95"));
        assert!(lines[1].contains(",1.960000,0.05,"));
        assert!(lines[1].ends_with(",385"));
    }

    #[test]
    fn test_csv_headline_precedes_sweep() {
        let request = SampleSizeRequest::new(1.96, 0.5, 0.031).with_population(REGISTERED_VOTERS_21ST);
        let result = estimate(&request).unwrap();
        let sweep = crate::core::sweep::sweep(&request, &[0.05], &[]).unwrap();
        let csv = PollReport::new(request, result, rendered_at())
            .with_sweep(sweep)
            .to_csv()
            .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",1000"));
        assert!(lines[2].ends_with(",385"));
    }
}
