// src/services/classifier.rs

//! Text classification.
//!
//! The pipeline only depends on [`TextClassifier`]. [`LinearTextModel`] is the
//! bundled implementation: it evaluates a TF-IDF + linear SVM pipeline that was
//! trained and exported elsewhere.
//!
//! ## Model file
//!
//! ```json
//! {
//!   "vocabulary": {"free": 0, "robux": 1, "free robux": 2},
//!   "idf": [1.7, 2.1, 3.0],
//!   "weights": [0.8, 1.2, 2.4],
//!   "intercept": -0.4,
//!   "platt_a": -3.1,
//!   "platt_b": 0.2,
//!   "ngram_range": [1, 2]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Label, Verdict};

/// Default word pattern: runs of two or more word characters.
const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Pre-trained binary classifier.
///
/// Implementations must be pure: the same text always yields the same verdict.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Verdict>;
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    weights: Vec<f64>,
    intercept: f64,
    platt_a: f64,
    platt_b: f64,
    #[serde(default = "default_ngram_range")]
    ngram_range: [usize; 2],
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
}

fn default_ngram_range() -> [usize; 2] {
    [1, 1]
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

/// TF-IDF features scored by a linear decision function with Platt scaling.
#[derive(Debug, Clone)]
pub struct LinearTextModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    weights: Vec<f64>,
    intercept: f64,
    platt_a: f64,
    platt_b: f64,
    ngram_range: (usize, usize),
    token_pattern: Regex,
}

impl LinearTextModel {
    /// Load an exported model from disk.
    ///
    /// A path that does not exist is reported as a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::config(format!(
                "model file {} not found (check moderation.model_path)",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::model(format!("cannot read model {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate an exported model.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    fn from_file(file: ModelFile) -> Result<Self> {
        let width = file.weights.len();
        if width == 0 {
            return Err(AppError::model("model has no features"));
        }
        if file.idf.len() != width {
            return Err(AppError::model(format!(
                "idf has {} entries but weights has {}",
                file.idf.len(),
                width
            )));
        }
        if let Some((term, column)) = file.vocabulary.iter().find(|(_, col)| **col >= width) {
            return Err(AppError::model(format!(
                "term '{}' maps to column {} outside {} features",
                term, column, width
            )));
        }
        let [min_n, max_n] = file.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(AppError::model(format!(
                "invalid ngram_range [{}, {}]",
                min_n, max_n
            )));
        }
        let finite = file
            .idf
            .iter()
            .chain(&file.weights)
            .chain([&file.intercept, &file.platt_a, &file.platt_b])
            .all(|v| v.is_finite());
        if !finite {
            return Err(AppError::model("model contains non-finite parameters"));
        }
        let token_pattern = Regex::new(&file.token_pattern)
            .map_err(|e| AppError::model(format!("invalid token_pattern: {}", e)))?;

        Ok(Self {
            vocabulary: file.vocabulary,
            idf: file.idf,
            weights: file.weights,
            intercept: file.intercept,
            platt_a: file.platt_a,
            platt_b: file.platt_b,
            ngram_range: (min_n, max_n),
            token_pattern,
        })
    }

    /// Number of features the model was trained with.
    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    /// Word n-grams of `text`, in order.
    fn terms(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > words.len() {
                break;
            }
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// L2-normalized TF-IDF vector as sparse `(column, value)` pairs.
    fn features(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_default() += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();
        features.sort_by_key(|(column, _)| *column);

        let norm = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut features {
                *value /= norm;
            }
        }
        features
    }

    /// Signed distance from the separating hyperplane.
    pub fn decision_function(&self, text: &str) -> f64 {
        self.features(text)
            .iter()
            .map(|(column, value)| self.weights[*column] * value)
            .sum::<f64>()
            + self.intercept
    }
}

impl TextClassifier for LinearTextModel {
    fn classify(&self, text: &str) -> Result<Verdict> {
        let decision = self.decision_function(text);
        let label = if decision > 0.0 {
            Label::Positive
        } else {
            Label::Negative
        };
        let probability = 1.0 / (1.0 + (self.platt_a * decision + self.platt_b).exp());
        Ok(Verdict::new(label, probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "vocabulary": {"free": 0, "robux": 1, "hello": 2, "free robux": 3},
        "idf": [1.0, 1.0, 1.0, 1.0],
        "weights": [2.0, 2.0, -3.0, 1.0],
        "intercept": -0.5,
        "platt_a": -2.0,
        "platt_b": 0.0,
        "ngram_range": [1, 2]
    }"#;

    fn model() -> LinearTextModel {
        LinearTextModel::from_json(MODEL).unwrap()
    }

    #[test]
    fn test_scam_text_is_positive_with_high_probability() {
        let verdict = model().classify("free robux click here").unwrap();
        assert_eq!(verdict.label, Label::Positive);
        assert!(verdict.probability > 0.95);
    }

    #[test]
    fn test_benign_text_is_negative() {
        let verdict = model().classify("hello").unwrap();
        assert_eq!(verdict.label, Label::Negative);
        assert!(verdict.probability < 0.01);
    }

    #[test]
    fn test_empty_text_scores_intercept_only() {
        let model = model();
        assert_eq!(model.decision_function(""), -0.5);
        let verdict = model.classify("").unwrap();
        assert_eq!(verdict.label, Label::Negative);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let model = model();
        let first = model.classify("free robux free robux").unwrap();
        let second = model.classify("free robux free robux").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_terms_include_bigrams_and_skip_short_tokens() {
        let terms = model().terms("a free robux!");
        assert_eq!(terms, vec!["free", "robux", "free robux"]);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let json = r#"{
            "vocabulary": {"free": 0},
            "idf": [1.0, 1.0],
            "weights": [1.0],
            "intercept": 0.0,
            "platt_a": -1.0,
            "platt_b": 0.0
        }"#;
        assert!(matches!(
            LinearTextModel::from_json(json),
            Err(AppError::Model(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_column() {
        let json = r#"{
            "vocabulary": {"free": 5},
            "idf": [1.0],
            "weights": [1.0],
            "intercept": 0.0,
            "platt_a": -1.0,
            "platt_b": 0.0
        }"#;
        assert!(LinearTextModel::from_json(json).is_err());
    }

    #[test]
    fn test_load_reads_model_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("model.json");
        fs::write(&path, MODEL).unwrap();

        let model = LinearTextModel::load(&path).unwrap();
        assert_eq!(model.feature_count(), 4);
    }

    #[test]
    fn test_missing_model_file_is_config_error() {
        let tmp = tempfile::TempDir::new().unwrap();

        let err = LinearTextModel::load(tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("absent.json")));
    }
}
