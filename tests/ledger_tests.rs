// tests for the session ledger

use safechat::{Entry, FailureKind, Ledger, Outcome};

fn alert(label: &str) -> Outcome {
    Outcome::Alert {
        label: label.to_string(),
        confidence: 0.9,
        message: "support info".to_string(),
    }
}

fn reply(text: &str) -> Outcome {
    Outcome::Reply {
        text: text.to_string(),
    }
}

#[test]
fn records_in_arrival_order() {
    let mut ledger = Ledger::new();
    ledger.record(Entry::new("first", reply("a")));
    ledger.record(Entry::new("second", alert("stress")));

    let entries = ledger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].input, "first");
    assert_eq!(entries[1].input, "second");
}

#[test]
fn stats_count_alert_labels_case_folded() {
    let mut ledger = Ledger::new();
    ledger.record(Entry::new("a", alert("Depression")));
    ledger.record(Entry::new("b", alert("depression")));
    ledger.record(Entry::new("c", alert("stress")));
    ledger.record(Entry::new("d", reply("doing fine")));

    let stats = ledger.stats();
    assert_eq!(stats.get("depression"), Some(&2));
    assert_eq!(stats.get("stress"), Some(&1));
    assert_eq!(stats.len(), 2);
}

#[test]
fn failures_do_not_reach_stats() {
    let mut ledger = Ledger::new();
    ledger.record(Entry::new(
        "a",
        Outcome::Failure {
            kind: FailureKind::Timeout,
            detail: "generation timed out".to_string(),
        },
    ));

    assert!(ledger.stats().is_empty());
}

#[test]
fn reset_clears_entries_and_stats_together() {
    let mut ledger = Ledger::new();
    ledger.record(Entry::new("a", alert("anxiety")));
    ledger.record(Entry::new("b", reply("hello")));

    ledger.reset();

    assert!(ledger.is_empty());
    assert!(ledger.stats().is_empty());
    assert_eq!(ledger.export().unwrap(), "[]");
}

#[test]
fn export_is_a_pure_read() {
    let mut ledger = Ledger::new();
    ledger.record(Entry::new("a", reply("hello")));

    let first = ledger.export().unwrap();
    let second = ledger.export().unwrap();
    assert_eq!(first, second);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn export_serializes_outcome_fields() {
    let mut ledger = Ledger::new();
    ledger.record(Entry::new("you ok?", alert("suicidal")));

    let json = ledger.export().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["input"], "you ok?");
    assert_eq!(parsed[0]["outcome"]["outcome"], "alert");
    assert_eq!(parsed[0]["outcome"]["label"], "suicidal");
}
