// session ledger - what happened this session, in order
// stats are derived from the entries, never tracked on the side

use crate::Error;
use crate::core::pipeline::Outcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub input: String,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(input: &str, outcome: Outcome) -> Self {
        Self {
            input: input.to_string(),
            outcome,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<Entry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // alert counts per label, case-folded; failures carry no meaningful
    // label and are left out
    pub fn stats(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            if let Outcome::Alert { label, .. } = &entry.outcome {
                *counts.entry(label.to_lowercase()).or_insert(0) += 1;
            }
        }
        counts
    }

    // clearing the entries clears the derived counts with them
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn export(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}
