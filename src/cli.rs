// command line interface

use crate::core::{Entry, Gate, HuggingFace, Ledger, Ollama, Pipeline};
use crate::output::Output;
use crate::{Error, Server};
use clap::{Parser, Subcommand};
use miette::Result;
use std::io::Write;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "safechat",
    about = "Chat with a local LLM behind a mental-health safety gate"
)]
struct Cli {
    /// generation backend url (ollama-style generate endpoint)
    #[arg(
        long,
        env = "SAFECHAT_BACKEND_URL",
        default_value = "http://localhost:11434/api/generate",
        global = true
    )]
    backend: String,

    /// generation model name
    #[arg(long, short, default_value = "gemma:2b", global = true)]
    model: String,

    /// classifier model id on the hugging face inference api
    #[arg(
        long,
        default_value = "tahaenesaslanturk/mental-health-classification-v0.2",
        global = true
    )]
    classifier: String,

    /// api token for the classifier service
    #[arg(long, short = 'k', env = "HF_API_TOKEN", global = true)]
    token: Option<String>,

    /// confidence a critical label needs before it blocks generation
    #[arg(long, default_value = "0.7", global = true)]
    threshold: f32,

    /// label that triggers the crisis alert (repeatable; defaults to the
    /// built-in crisis set)
    #[arg(long = "critical-label", global = true)]
    critical_labels: Vec<String>,

    /// request timeout in seconds
    #[arg(long, default_value = "60", global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// start as http server
    Serve {
        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let labels = if cli.critical_labels.is_empty() {
        Gate::default_labels()
    } else {
        cli.critical_labels.clone()
    };

    let gate = Gate::new(labels, cli.threshold);
    let classifier = HuggingFace::new(&cli.classifier, cli.token.clone());
    let backend = Ollama::new(&cli.backend, &cli.model, Duration::from_secs(cli.timeout));
    let pipeline = Pipeline::new(gate, classifier, backend);

    match cli.command {
        Some(Commands::Serve { port, host }) => Ok(Server::run(pipeline, &host, port).await?),
        None => Ok(chat(pipeline).await?),
    }
}

// interactive chat loop; quit/exit leaves, /stats /export /reset manage
// the session
async fn chat(pipeline: Pipeline<HuggingFace, Ollama>) -> Result<(), Error> {
    let mut ledger = Ledger::new();
    let stdin = std::io::stdin();

    loop {
        print!("you: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // eof
        }
        let line = line.trim();

        match line {
            "" => continue,
            "quit" | "exit" => break,
            "/stats" => Output::stats(&ledger.stats()),
            "/reset" => {
                ledger.reset();
                println!("session cleared\n");
            }
            _ if line.starts_with("/export") => {
                let path = line.trim_start_matches("/export").trim();
                if path.is_empty() {
                    println!("usage: /export <path>\n");
                    continue;
                }
                std::fs::write(path, ledger.export()?)?;
                println!("wrote {} entries to {path}\n", ledger.len());
            }
            _ => {
                let outcome = pipeline.process(line).await;
                ledger.record(Entry::new(line, outcome.clone()));
                Output::outcome(&outcome);
            }
        }
    }

    Ok(())
}
