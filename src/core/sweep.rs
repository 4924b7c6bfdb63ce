use crate::core::estimator::estimate;
use crate::domain::model::{ConfidenceLevel, SampleSizeRequest, SweepRow};
use crate::utils::error::Result;

pub const CSV_HEADER: [&str; 5] = [
    "confidence_level",
    "z",
    "margin_of_error",
    "required_n",
    "reported_n",
];

/// One table row for `request` as given.
pub fn row_for(request: &SampleSizeRequest) -> Result<SweepRow> {
    let result = estimate(request)?;
    Ok(SweepRow {
        confidence_level: ConfidenceLevel::fraction_for_z(request.confidence_z)?,
        z: request.confidence_z,
        margin_of_error: request.margin_of_error,
        required_n: result.required_n,
        reported_n: result.reported_n(),
    })
}

/// Evaluates `base` over every margin × confidence level, margins outer.
///
/// Population and proportion are taken from `base`. With no levels the
/// single column uses `base.confidence_z`. Any invalid entry aborts the
/// whole sweep.
pub fn sweep(
    base: &SampleSizeRequest,
    margins: &[f64],
    levels: &[ConfidenceLevel],
) -> Result<Vec<SweepRow>> {
    let columns = levels
        .iter()
        .map(|level| Ok((level.fraction(), level.z_score()?)))
        .collect::<Result<Vec<_>>>()?;
    let columns = if columns.is_empty() {
        vec![(
            ConfidenceLevel::fraction_for_z(base.confidence_z)?,
            base.confidence_z,
        )]
    } else {
        columns
    };

    let mut rows = Vec::with_capacity(margins.len() * columns.len());
    for &margin in margins {
        for &(confidence_level, z) in &columns {
            let request = SampleSizeRequest {
                confidence_z: z,
                margin_of_error: margin,
                ..*base
            };
            let result = estimate(&request)?;
            rows.push(SweepRow {
                confidence_level,
                z,
                margin_of_error: margin,
                required_n: result.required_n,
                reported_n: result.reported_n(),
            });
        }
    }

    tracing::debug!("Sweep produced {} rows", rows.len());
    Ok(rows)
}

pub fn rows_to_csv(rows: &[SweepRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record([
            format!("{}", row.confidence_level),
            format!("{:.6}", row.z),
            format!("{}", row.margin_of_error),
            format!("{:.4}", row.required_n),
            row.reported_n.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(values: &[f64]) -> Vec<ConfidenceLevel> {
        values
            .iter()
            .map(|&v| ConfidenceLevel::from_fraction(v).unwrap())
            .collect()
    }

    #[test]
    fn test_sweep_orders_margins_outer() {
        let base = SampleSizeRequest::new(1.96, 0.5, 0.05);
        let rows = sweep(&base, &[0.03, 0.05], &levels(&[0.90, 0.95])).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].margin_of_error, 0.03);
        assert_eq!(rows[0].confidence_level, 0.90);
        assert_eq!(rows[1].margin_of_error, 0.03);
        assert_eq!(rows[1].confidence_level, 0.95);
        assert_eq!(rows[2].margin_of_error, 0.05);
        assert_eq!(rows[3].reported_n, 385);
    }

    #[test]
    fn test_sweep_rows_respect_monotonicity() {
        let base = SampleSizeRequest::new(1.96, 0.5, 0.05).with_population(44_391_871);
        let rows = sweep(&base, &[0.01, 0.02, 0.031, 0.05], &levels(&[0.95])).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[0].required_n >= pair[1].required_n);
        }
    }

    #[test]
    fn test_sweep_empty_and_invalid() {
        let base = SampleSizeRequest::new(1.96, 0.5, 0.05);
        assert!(sweep(&base, &[], &levels(&[0.95])).unwrap().is_empty());

        let err = sweep(&base, &[0.05, 0.0], &levels(&[0.95])).unwrap_err();
        assert_eq!(err.field(), Some("margin_of_error"));
    }

    #[test]
    fn test_sweep_without_levels_uses_request_z() {
        let base = SampleSizeRequest::new(2.576, 0.5, 0.05);
        let headline = estimate(&base).unwrap().reported_n();
        let rows = sweep(&base, &[0.05, 0.03], &[]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].z, 2.576);
        assert_eq!(rows[0].reported_n, headline);
        assert_eq!(rows[0].reported_n, 664);
        assert!((rows[0].confidence_level - 0.99).abs() < 1e-4);
    }

    #[test]
    fn test_row_for_matches_estimate() {
        let request = SampleSizeRequest::new(1.96, 0.5, 0.05).with_population(1000);
        let row = row_for(&request).unwrap();
        assert_eq!(row.z, 1.96);
        assert_eq!(row.reported_n, 278);
        assert!(row_for(&SampleSizeRequest::new(1.96, 0.5, 0.0)).is_err());
    }

    #[test]
    fn test_rows_to_csv() {
        let base = SampleSizeRequest::new(1.96, 0.5, 0.05);
        let rows = sweep(&base, &[0.05], &levels(&[0.95])).unwrap();
        let csv = rows_to_csv(&rows).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("confidence_level,z,margin_of_error,required_n,reported_n")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("0.95,1.959964,0.05,"));
        assert!(row.ends_with(",385"));
        assert!(lines.next().is_none());
    }
}
