// safechat library - chat with a local llm behind a mental-health safety gate

pub mod cli;
mod core;
mod error;
mod output;
mod server;

pub use core::{
    Aggregate, Classification, Classify, Decision, Entry, FailureKind, Gate, Generate, HuggingFace,
    Ledger, Ollama, Outcome, Pipeline, StreamError,
};
pub use error::Error;
pub use server::Server;
