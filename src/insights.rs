//! Which features drive the model, in words a retention team can act on.

use serde::Serialize;

use crate::error::InsightError;
use crate::features::matrix::FeatureSpec;

/// Number of features the chart and the PDF page show.
pub const TOP_FEATURES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub friendly_name: String,
    pub importance: f64,
}

/// Pair every feature with its importance, most important first.
/// Equal importances keep feature-list order.
pub fn rank_importances(
    spec: &FeatureSpec,
    importances: &[f64],
) -> Result<Vec<FeatureImportance>, InsightError> {
    if spec.len() != importances.len() {
        return Err(InsightError::LengthMismatch {
            features: spec.len(),
            importances: importances.len(),
        });
    }
    let mut ranked: Vec<FeatureImportance> = spec
        .names()
        .iter()
        .zip(importances)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            friendly_name: friendly_name(feature),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(ranked)
}

/// Display label for a Telco feature column.
pub fn friendly_name(feature: &str) -> String {
    let known = match feature {
        "gender" => "Gender",
        "SeniorCitizen" => "Senior Citizen (65+)",
        "Partner" => "Has Partner",
        "Dependents" => "Has Dependents",
        "tenure" => "Months as Customer",
        "PhoneService" => "Has Phone Service",
        "MultipleLines" => "Multiple Phone Lines",
        "InternetService" => "Internet Service Type",
        "OnlineSecurity" => "Online Security Add-on",
        "OnlineBackup" => "Online Backup Add-on",
        "DeviceProtection" => "Device Protection",
        "TechSupport" => "Tech Support",
        "StreamingTV" => "Streaming TV",
        "StreamingMovies" => "Streaming Movies",
        "Contract" => "Contract Type",
        "PaperlessBilling" => "Paperless Billing",
        "PaymentMethod" => "Payment Method",
        "MonthlyCharges" => "Monthly Bill ($)",
        "TotalCharges" => "Total Charges ($)",
        other => return title_case(&other.replace('_', " ")),
    };
    known.to_string()
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Why a feature matters, for the top-ranked drivers.
pub fn explanation(feature: &str) -> String {
    match feature {
        "Contract" => "Contract type is crucial; month-to-month customers are more likely to leave".to_string(),
        "tenure" => "Customer loyalty matters; newer customers are at higher risk".to_string(),
        "TotalCharges" => "Total spending indicates engagement level".to_string(),
        "MonthlyCharges" => "High bills without perceived value can drive churn".to_string(),
        "InternetService" => "Service type affects satisfaction and retention".to_string(),
        other => format!("{} significantly influences churn decisions", friendly_name(other)),
    }
}
