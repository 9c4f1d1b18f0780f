use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::models::ScoredRecord;

pub const RISK_COLUMN: &str = "Churn_Risk";
pub const PROBABILITY_COLUMN: &str = "Churn_Probability";
pub const PREDICTION_COLUMN: &str = "Prediction";

/// Write the scored batch as CSV: every input column in first-seen order,
/// then the risk tier, the probability as a percentage and the prediction.
///
/// Input columns that already use one of the result names are replaced.
pub fn write_csv<W: Write>(scored: &[ScoredRecord], out: W) -> Result<()> {
    let result_columns = [RISK_COLUMN, PROBABILITY_COLUMN, PREDICTION_COLUMN];

    let mut columns: Vec<&str> = Vec::new();
    for s in scored {
        for (name, _) in s.record.iter() {
            if !result_columns.contains(&name) && !columns.contains(&name) {
                columns.push(name);
            }
        }
    }

    let mut wtr = ::csv::Writer::from_writer(out);
    wtr.write_record(columns.iter().copied().chain(result_columns))?;

    for s in scored {
        let mut row: Vec<String> = columns
            .iter()
            .map(|c| s.record.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        row.push(s.result.tier.label().to_string());
        row.push(format_probability(s.result.probability));
        row.push(s.result.label.to_string());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `0.8512` → `85.1%`
pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(value: &T, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChurnLabel, PredictionResult, RawRecord, RawValue, RiskTier};

    fn scored(id: &str, p: f64, tier: RiskTier, label: ChurnLabel) -> ScoredRecord {
        ScoredRecord {
            record: RawRecord::new()
                .with("customerID", RawValue::Text(id.into()))
                .with("tenure", RawValue::Text("5".into()))
                .with("TotalCharges", RawValue::Missing),
            result: PredictionResult { label, probability: p, tier },
        }
    }

    #[test]
    fn test_csv_appends_result_columns() {
        let rows = vec![
            scored("7590-VHVEG", 0.8512, RiskTier::High, ChurnLabel::Churn),
            scored("5575-GNVDE", 0.1, RiskTier::Low, ChurnLabel::Stay),
        ];
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "customerID,tenure,TotalCharges,Churn_Risk,Churn_Probability,Prediction");
        assert_eq!(lines[1], "7590-VHVEG,5,,High Risk,85.1%,Likely to Churn");
        assert_eq!(lines[2], "5575-GNVDE,5,,Low Risk,10.0%,Likely to Stay");
    }

    #[test]
    fn test_csv_replaces_stale_result_column() {
        let mut row = scored("A", 0.45, RiskTier::Medium, ChurnLabel::Stay);
        row.record.insert("Churn_Risk", RawValue::Text("old".into()));
        let mut buf = Vec::new();
        write_csv(&[row], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("customerID,tenure,TotalCharges,Churn_Risk,"));
        assert!(!text.contains("old"));
        assert!(text.contains("Medium Risk,45.0%,Likely to Stay"));
    }

    #[test]
    fn test_empty_batch_writes_header_only() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Churn_Risk,Churn_Probability,Prediction\n");
    }

    #[test]
    fn test_json_keeps_record_fields() {
        let row = scored("A", 0.45, RiskTier::Medium, ChurnLabel::Stay);
        let mut buf = Vec::new();
        write_json(&[row], &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v[0]["record"]["customerID"], "A");
        assert_eq!(v[0]["result"]["tier"], "Medium");
    }
}
