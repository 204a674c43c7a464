// safety gate - decides whether a message gets a normal reply
// label set and threshold are policy, injected rather than hard-coded

use crate::Error;
use crate::core::classify::Classify;

// labels that signal a crisis rather than a conversation
const CRITICAL_LABELS: [&str; 5] = ["suicidal", "suicidewatch", "depression", "stress", "anxiety"];
const DEFAULT_THRESHOLD: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Block { label: String, confidence: f32 },
    Proceed,
}

#[derive(Debug, Clone)]
pub struct Gate {
    labels: Vec<String>,
    threshold: f32,
}

impl Gate {
    pub fn new(labels: Vec<String>, threshold: f32) -> Self {
        // store lowercase so config casing never matters
        let labels = labels.into_iter().map(|l| l.to_lowercase()).collect();
        Self { labels, threshold }
    }

    pub fn default_labels() -> Vec<String> {
        CRITICAL_LABELS.iter().map(|l| l.to_string()).collect()
    }

    // one classifier call per message; a classifier failure propagates,
    // it never falls through to "safe"
    pub async fn evaluate<C: Classify>(
        &self,
        message: &str,
        classifier: &C,
    ) -> Result<Decision, Error> {
        let result = classifier.classify(message).await?;

        let critical = self.labels.contains(&result.label.to_lowercase());
        if critical && result.confidence > self.threshold {
            return Ok(Decision::Block {
                label: result.label,
                confidence: result.confidence,
            });
        }

        Ok(Decision::Proceed)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(Self::default_labels(), DEFAULT_THRESHOLD)
    }
}
