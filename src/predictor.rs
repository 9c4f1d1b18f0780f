//! Normalize-then-score over a loaded [`Artifacts`] handle.

use serde::Serialize;

use crate::artifacts::Artifacts;
use crate::error::ScoreError;
use crate::features::normalizer::{normalize, NormalizeWarning};
use crate::models::{PredictionResult, RawRecord, RiskTier, ScoredRecord};
use crate::scoring::{score, RiskThresholds};

pub struct Predictor<'a> {
    artifacts: &'a Artifacts,
    thresholds: RiskThresholds,
}

#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub scored: Vec<ScoredRecord>,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Serialize)]
pub struct SingleOutcome {
    pub result: PredictionResult,
    pub warnings: Vec<NormalizeWarning>,
}

/// Counts per risk tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierSummary {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TierSummary {
    pub fn from_results<'r>(results: impl IntoIterator<Item = &'r PredictionResult>) -> Self {
        let mut s = TierSummary::default();
        for r in results {
            s.total += 1;
            match r.tier {
                RiskTier::Low => s.low += 1,
                RiskTier::Medium => s.medium += 1,
                RiskTier::High => s.high += 1,
            }
        }
        s
    }

    pub fn count(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }

    /// Share of `tier` in percent; 0 for an empty batch.
    pub fn percent(&self, tier: RiskTier) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(tier) as f64 * 100.0 / self.total as f64
        }
    }
}

impl BatchOutcome {
    pub fn summary(&self) -> TierSummary {
        TierSummary::from_results(self.scored.iter().map(|s| &s.result))
    }
}

impl<'a> Predictor<'a> {
    pub fn new(artifacts: &'a Artifacts, thresholds: RiskThresholds) -> Self {
        Self { artifacts, thresholds }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Score every record, keeping input order and the original columns.
    pub fn predict_batch(&self, records: Vec<RawRecord>) -> Result<BatchOutcome, ScoreError> {
        let normalized = normalize(&records, &self.artifacts.spec, &self.artifacts.encoders);
        let results = score(
            &normalized.matrix,
            self.artifacts.classifier.as_ref(),
            &self.thresholds,
        )?;

        let scored = records
            .into_iter()
            .zip(results)
            .map(|(record, result)| ScoredRecord { record, result })
            .collect();

        Ok(BatchOutcome {
            scored,
            warnings: normalized.warnings,
        })
    }

    pub fn predict_one(&self, record: RawRecord) -> Result<SingleOutcome, ScoreError> {
        let mut outcome = self.predict_batch(vec![record])?;
        let result = outcome
            .scored
            .pop()
            .map(|s| s.result)
            .ok_or(ScoreError::LengthMismatch { what: "results", expected: 1, actual: 0 })?;
        Ok(SingleOutcome {
            result,
            warnings: outcome.warnings,
        })
    }
}
