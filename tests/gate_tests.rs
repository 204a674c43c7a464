// tests for the safety gate policy

use safechat::{Classification, Classify, Decision, Error, Gate};

struct FakeClassifier {
    label: &'static str,
    confidence: f32,
    fail: bool,
}

impl Classify for FakeClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, Error> {
        if self.fail {
            return Err(Error::Classifier("classifier offline".to_string()));
        }
        Ok(Classification {
            label: self.label.to_string(),
            confidence: self.confidence,
        })
    }
}

fn fake(label: &'static str, confidence: f32) -> FakeClassifier {
    FakeClassifier {
        label,
        confidence,
        fail: false,
    }
}

#[tokio::test]
async fn blocks_critical_label_over_threshold() {
    let gate = Gate::default();

    let decision = gate.evaluate("some message", &fake("suicidal", 0.9)).await.unwrap();
    assert_eq!(
        decision,
        Decision::Block {
            label: "suicidal".to_string(),
            confidence: 0.9
        }
    );
}

#[tokio::test]
async fn label_compare_is_case_insensitive() {
    let gate = Gate::default();

    // classifier casing is preserved in the decision, only the compare folds
    let decision = gate.evaluate("some message", &fake("Depression", 0.82)).await.unwrap();
    assert_eq!(
        decision,
        Decision::Block {
            label: "Depression".to_string(),
            confidence: 0.82
        }
    );
}

#[tokio::test]
async fn proceeds_at_exactly_the_threshold() {
    // the policy is strictly greater than, so 0.7 itself passes through
    let gate = Gate::default();
    let decision = gate.evaluate("some message", &fake("anxiety", 0.7)).await.unwrap();
    assert_eq!(decision, Decision::Proceed);
}

#[tokio::test]
async fn proceeds_on_neutral_label() {
    let gate = Gate::default();
    let decision = gate.evaluate("some message", &fake("Neutral", 0.95)).await.unwrap();
    assert_eq!(decision, Decision::Proceed);
}

#[tokio::test]
async fn proceeds_on_low_confidence_critical_label() {
    let gate = Gate::default();
    let decision = gate.evaluate("some message", &fake("stress", 0.4)).await.unwrap();
    assert_eq!(decision, Decision::Proceed);
}

#[tokio::test]
async fn custom_policy_replaces_the_defaults() {
    let gate = Gate::new(vec!["Spam".to_string()], 0.5);

    let decision = gate.evaluate("some message", &fake("spam", 0.6)).await.unwrap();
    assert!(matches!(decision, Decision::Block { .. }));

    // the built-in crisis set is no longer in play
    let decision = gate.evaluate("some message", &fake("suicidal", 0.99)).await.unwrap();
    assert_eq!(decision, Decision::Proceed);
}

#[tokio::test]
async fn classifier_failure_propagates() {
    let gate = Gate::default();
    let classifier = FakeClassifier {
        label: "",
        confidence: 0.0,
        fail: true,
    };

    assert!(gate.evaluate("some message", &classifier).await.is_err());
}
