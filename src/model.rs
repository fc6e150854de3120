use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::SchemaError;
use crate::features::{FeatureSchema, FeatureVector};
use crate::types::{Decision, FeatureImportance};

/// Pre-trained acceptance classifier, loaded once and pure thereafter.
///
/// The artifact mirrors the trained pipeline: a feature-selection mask
/// over the schema followed by a linear scoring stage, plus the Gini
/// importances recorded for the selected features at training time.
/// `weights`, `impute`, and `importances` are dense over the selected
/// features, in schema order.
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptanceModel {
    features: Vec<Arc<str>>,
    selected: Vec<bool>,
    weights: Vec<f64>,
    intercept: f64,
    impute: Vec<f64>,
    importances: Vec<f64>,
}

impl AcceptanceModel {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model artifact: {}", path.display()))?;
        let model: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid model artifact: {}", path.display()))?;
        model.validate().with_context(|| format!("Inconsistent model artifact: {}", path.display()))?;
        Ok(model)
    }

    /// Internal consistency: one mask entry per feature, one weight,
    /// imputation value, and importance per selected feature.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.selected.len() != self.features.len() {
            return Err(SchemaError::ArtifactMismatch(format!(
                "selection mask covers {} features, model has {}",
                self.selected.len(),
                self.features.len()
            )));
        }
        let retained = self.selected.iter().filter(|s| **s).count();
        for (name, len) in [
            ("weights", self.weights.len()),
            ("impute", self.impute.len()),
            ("importances", self.importances.len()),
        ] {
            if len != retained {
                return Err(SchemaError::ArtifactMismatch(format!(
                    "{name} has {len} entries for {retained} selected features"
                )));
            }
        }
        Ok(())
    }

    /// The model's column contract must equal the schema artifact exactly,
    /// names and order both.
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), SchemaError> {
        if self.features.len() != schema.len()
            || self.features.iter().zip(schema.names()).any(|(a, b)| a != b)
        {
            return Err(SchemaError::ArtifactMismatch(
                "model feature list differs from schema artifact".into(),
            ));
        }
        Ok(())
    }

    /// Acceptance probability for a vector assembled against this model's
    /// schema. Missing or non-numeric cells take the per-feature
    /// imputation value recorded at training time.
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<f64, SchemaError> {
        if vector.len() != self.features.len()
            || vector.names().zip(&self.features).any(|(a, b)| a != b)
        {
            return Err(SchemaError::ArtifactMismatch(
                "feature vector does not match model schema".into(),
            ));
        }

        let mut z = self.intercept;
        let mut dense = 0;
        for (value, &selected) in vector.values().zip(&self.selected) {
            if !selected {
                continue;
            }
            let x = value.as_f64().unwrap_or(self.impute[dense]);
            z += self.weights[dense] * x;
            dense += 1;
        }
        Ok(sigmoid(z))
    }

    /// Binary decision with probability and top-feature explanation.
    pub fn predict(&self, vector: &FeatureVector) -> Result<Decision, SchemaError> {
        let probability = self.predict_proba(vector)?;
        Ok(Decision {
            accepted: is_accepted(probability),
            probability,
            top_features: self.top_features(),
        })
    }

    /// Up to five selected features by descending importance.
    ///
    /// Importances round to two decimals before ranking; the sort is
    /// stable, so ties keep original feature order.
    pub fn top_features(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = self
            .features
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .zip(&self.importances)
            .map(|((name, _), importance)| FeatureImportance {
                name: Arc::clone(name),
                importance: round2(*importance),
            })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked.truncate(5);
        ranked
    }
}

/// Strict threshold: exactly 0.5 is a rejection.
fn is_accepted(probability: f64) -> bool {
    probability > 0.5
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::features::assemble;
    use crate::census::CensusRecord;
    use crate::types::{CellValue, Coordinate};

    fn model(value: serde_json::Value) -> AcceptanceModel {
        let model: AcceptanceModel = serde_json::from_value(value).unwrap();
        model.validate().unwrap();
        model
    }

    /// Intercept-only model: probability is sigmoid(intercept).
    fn flat_model(intercept: f64) -> AcceptanceModel {
        model(json!({
            "features": ["lat", "long"],
            "selected": [false, false],
            "weights": [],
            "intercept": intercept,
            "impute": [],
            "importances": [],
        }))
    }

    fn vector_for(model: &AcceptanceModel) -> FeatureVector {
        let schema = FeatureSchema::new(model.features.iter().map(|n| n.as_ref()));
        assemble(Coordinate::new(-23.5, -46.6), 7_000.0, &CensusRecord::default(), &schema)
            .unwrap()
    }

    #[test]
    fn probability_exactly_half_is_rejected() {
        let m = flat_model(0.0);
        let decision = m.predict(&vector_for(&m)).unwrap();
        assert_eq!(decision.probability, 0.5);
        assert!(!decision.accepted);
    }

    #[test]
    fn probability_just_above_half_is_accepted() {
        // sigmoid(4e-6) ≈ 0.500001
        let m = flat_model(4e-6);
        let decision = m.predict(&vector_for(&m)).unwrap();
        assert!(decision.probability > 0.5);
        assert!(decision.accepted);
    }

    #[test]
    fn missing_values_use_imputation() {
        let m = model(json!({
            "features": ["B_V011"],
            "selected": [true],
            "weights": [1.0],
            "intercept": 0.0,
            "impute": [2.0],
            "importances": [1.0],
        }));
        let schema = FeatureSchema::new(["B_V011"]);
        let census = CensusRecord::from_pairs(vec![("B_V011".into(), CellValue::Missing)]);
        let vector = assemble(Coordinate::new(0.0, 0.0), 7_000.0, &census, &schema).unwrap();
        let p = m.predict_proba(&vector).unwrap();
        assert!((p - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn unselected_features_do_not_score() {
        let m = model(json!({
            "features": ["lat", "B_V011"],
            "selected": [false, true],
            "weights": [1.0],
            "intercept": 0.0,
            "impute": [0.0],
            "importances": [1.0],
        }));
        let schema = FeatureSchema::new(["lat", "B_V011"]);
        let census = CensusRecord::from_pairs(vec![("B_V011".into(), CellValue::Number(0.0))]);
        let vector = assemble(Coordinate::new(89.0, 0.0), 7_000.0, &census, &schema).unwrap();
        // lat is huge but unselected; score stays at the intercept
        assert_eq!(m.predict_proba(&vector).unwrap(), 0.5);
    }

    #[test]
    fn top_features_rank_by_rounded_importance_stable_under_ties() {
        let m = model(json!({
            "features": ["a", "b", "c", "d", "e", "f", "g"],
            "selected": [true, true, true, true, true, true, true],
            "weights": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "intercept": 0.0,
            "impute": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            // b and d round to the same 0.20; b comes first in feature order
            "importances": [0.10, 0.201, 0.30, 0.199, 0.05, 0.02, 0.01],
        }));
        let top = m.top_features();
        assert_eq!(top.len(), 5);
        let names: Vec<&str> = top.iter().map(|f| f.name.as_ref()).collect();
        assert_eq!(names, ["c", "b", "d", "a", "e"]);
        assert_eq!(top[1].importance, 0.2);
        assert_eq!(top[2].importance, 0.2);
    }

    #[test]
    fn fewer_than_five_selected_features_is_fine() {
        let m = model(json!({
            "features": ["a", "b", "c"],
            "selected": [true, false, true],
            "weights": [0.0, 0.0],
            "intercept": 0.0,
            "impute": [0.0, 0.0],
            "importances": [0.4, 0.6],
        }));
        let top = m.top_features();
        assert_eq!(top.len(), 2);
        let names: Vec<&str> = top.iter().map(|f| f.name.as_ref()).collect();
        assert_eq!(names, ["c", "a"]);
    }

    #[test]
    fn inconsistent_artifact_fails_validation() {
        let m: AcceptanceModel = serde_json::from_value(json!({
            "features": ["a", "b"],
            "selected": [true, true],
            "weights": [1.0],
            "intercept": 0.0,
            "impute": [0.0, 0.0],
            "importances": [0.5, 0.5],
        }))
        .unwrap();
        assert!(matches!(m.validate(), Err(SchemaError::ArtifactMismatch(_))));
    }

    #[test]
    fn schema_mismatch_is_detected() {
        let m = flat_model(0.0);
        let schema = FeatureSchema::new(["long", "lat"]); // reordered
        assert!(matches!(m.check_schema(&schema), Err(SchemaError::ArtifactMismatch(_))));
    }
}
