//! Classifier verdicts.

use std::fmt;

/// Binary decision of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Scam / abusive
    Positive,
    Negative,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Positive => f.write_str("Scam"),
            Label::Negative => f.write_str("Not a scam"),
        }
    }
}

/// Output of one classifier call. `label` and `probability` always come
/// from the same evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub label: Label,

    /// Estimated probability of the positive class, in `[0, 1]`
    pub probability: f64,
}

impl Verdict {
    pub fn new(label: Label, probability: f64) -> Self {
        Self { label, probability }
    }
}

/// Verdict for a feed item, together with the text that was scored.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: Label,
    pub probability: f64,
    pub normalized_text: String,
}

impl ClassificationResult {
    /// Flag rule: positive label and probability strictly above `threshold`.
    pub fn is_flagged(&self, threshold: f64) -> bool {
        self.label == Label::Positive && self.probability > threshold
    }
}

/// Preprocessing applied before scoring: lowercase only.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}
