// the per-message pipeline: classify, gate, then maybe generate
// exactly one outcome per call, no retries

use crate::core::classify::Classify;
use crate::core::gate::{Decision, Gate};
use crate::core::generate::{Generate, StreamError};
use serde::Serialize;
use tracing::{debug, warn};

// shown when the model streams a reply that trims down to nothing
const FALLBACK_REPLY: &str =
    "I don't have an answer for that right now. Could you try rephrasing?";

// support text for a blocked message; {label} and {confidence} are filled
// in per alert
const ALERT_TEMPLATE: &str = "Critical situation detected. It looks like you may be experiencing \
     '{label}' (confidence {confidence}). You can call the AASRA Helpline (India) at 9152987821 \
     for support.";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyInput,
    ClassifierUnavailable,
    ConnectionFailed,
    MalformedFragment,
    TruncatedStream,
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty input",
            Self::ClassifierUnavailable => "classifier unavailable",
            Self::ConnectionFailed => "connection failed",
            Self::MalformedFragment => "malformed fragment",
            Self::TruncatedStream => "truncated stream",
            Self::Timeout => "timeout",
        }
    }
}

impl From<&StreamError> for FailureKind {
    fn from(error: &StreamError) -> Self {
        match error {
            StreamError::EmptyPrompt => Self::EmptyInput,
            StreamError::ConnectionFailed(_) => Self::ConnectionFailed,
            StreamError::MalformedFragment(_) => Self::MalformedFragment,
            StreamError::TruncatedStream => Self::TruncatedStream,
            StreamError::Timeout => Self::Timeout,
        }
    }
}

// exactly one of these per processed message
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Alert {
        label: String,
        confidence: f32,
        message: String,
    },
    Reply {
        text: String,
    },
    Failure {
        kind: FailureKind,
        detail: String,
    },
}

pub struct Pipeline<C, G> {
    gate: Gate,
    classifier: C,
    backend: G,
    alert_template: String,
}

impl<C: Classify, G: Generate> Pipeline<C, G> {
    pub fn new(gate: Gate, classifier: C, backend: G) -> Self {
        Self {
            gate,
            classifier,
            backend,
            alert_template: ALERT_TEMPLATE.to_string(),
        }
    }

    pub fn with_alert_template(mut self, template: &str) -> Self {
        self.alert_template = template.to_string();
        self
    }

    pub async fn process(&self, user_text: &str) -> Outcome {
        let message = user_text.trim();
        if message.is_empty() {
            return Outcome::Failure {
                kind: FailureKind::EmptyInput,
                detail: "message is empty".to_string(),
            };
        }

        let decision = match self.gate.evaluate(message, &self.classifier).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(error = %e, "classifier failed, not generating");
                return Outcome::Failure {
                    kind: FailureKind::ClassifierUnavailable,
                    detail: e.to_string(),
                };
            }
        };

        if let Decision::Block { label, confidence } = decision {
            warn!(%label, confidence, "critical label, blocking generation");
            let message = self
                .alert_template
                .replace("{label}", &label)
                .replace("{confidence}", &format!("{confidence:.2}"));
            return Outcome::Alert {
                label,
                confidence,
                message,
            };
        }

        debug!("message cleared, generating");
        let aggregate = self.backend.fetch(message).await;

        if let Some(error) = &aggregate.error {
            return Outcome::Failure {
                kind: FailureKind::from(error),
                detail: error.to_string(),
            };
        }

        let reply = aggregate.text.trim();
        if reply.is_empty() {
            // an empty visible reply reads like a dropped message
            return Outcome::Reply {
                text: FALLBACK_REPLY.to_string(),
            };
        }

        Outcome::Reply {
            text: reply.to_string(),
        }
    }
}
