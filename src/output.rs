// terminal formatting for chat outcomes and session stats

use crate::core::Outcome;
use std::collections::BTreeMap;

pub struct Output;

impl Output {
    pub fn outcome(outcome: &Outcome) {
        match outcome {
            Outcome::Reply { text } => println!("bot: {text}\n"),

            // a blocked message is support info, not an error
            Outcome::Alert { message, .. } => println!("\n!! {message}\n"),

            Outcome::Failure { kind, detail } => println!("\nerror ({}): {detail}\n", kind.as_str()),
        }
    }

    pub fn stats(counts: &BTreeMap<String, usize>) {
        if counts.is_empty() {
            println!("no alerts this session\n");
            return;
        }

        // column width from the longest label
        let width = counts.keys().map(|l| l.len()).max().unwrap_or(0);
        for (label, count) in counts {
            println!("{label:width$}  {count}");
        }
        println!();
    }
}
