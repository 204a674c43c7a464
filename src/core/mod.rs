// core logic - classifier, safety gate, stream aggregation, pipeline, ledger

mod classify;
mod gate;
mod generate;
mod ledger;
mod pipeline;

pub use classify::{Classification, Classify, HuggingFace};
pub use gate::{Decision, Gate};
pub use generate::{Aggregate, Generate, Ollama, StreamError};
pub use ledger::{Entry, Ledger};
pub use pipeline::{FailureKind, Outcome, Pipeline};
