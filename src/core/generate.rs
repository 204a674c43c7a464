// streaming generation - talks to an ollama-style generate api
// the reply arrives as newline-delimited json fragments that get folded
// into one string, in arrival order

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    #[error("refusing to send an empty prompt")]
    EmptyPrompt,

    #[error("could not reach generation backend: {0}")]
    ConnectionFailed(String),

    #[error("malformed stream fragment: {0}")]
    MalformedFragment(String),

    #[error("stream closed before the completion signal")]
    TruncatedStream,

    #[error("generation timed out")]
    Timeout,
}

// what one generate call folds down to; text is only a finished reply
// when complete is true
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub text: String,
    pub complete: bool,
    pub error: Option<StreamError>,
}

// seam for the generation backend
pub trait Generate {
    fn fetch(&self, message: &str) -> impl Future<Output = Aggregate> + Send;
}

// wire body for the generate endpoint
#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

// one line of the response stream
#[derive(Deserialize)]
struct Fragment {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
}

pub struct Ollama {
    client: reqwest::Client,
    url: String,
    model: String,
    timeout: Duration,
}

impl Ollama {
    pub fn new(url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    // streams lines into `text`; Ok(true) means the backend said done.
    // lines are split on raw newline bytes so a utf-8 character torn
    // across chunks never corrupts a fragment
    async fn read_stream(&self, prompt: String, text: &mut String) -> Result<bool, StreamError> {
        let request = Request {
            model: &self.model,
            prompt,
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| StreamError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StreamError::ConnectionFailed(format!(
                "backend returned {}",
                response.status()
            )));
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                // connection dropped mid-body: partial content, not a
                // connect failure
                Err(_) => return Ok(false),
            };

            buffer.extend_from_slice(&bytes);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = &line[..line.len() - 1];

                if blank(line) {
                    continue;
                }
                if fold(line, text)? {
                    return Ok(true);
                }
            }
        }

        // a final line without a trailing newline still counts
        if !blank(&buffer) && fold(&buffer, text)? {
            return Ok(true);
        }

        Ok(false)
    }
}

fn blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

// decode one line and append its text; true means the stream is done
fn fold(line: &[u8], text: &mut String) -> Result<bool, StreamError> {
    let fragment: Fragment =
        serde_json::from_slice(line).map_err(|e| StreamError::MalformedFragment(e.to_string()))?;

    if let Some(piece) = &fragment.response {
        text.push_str(piece);
    }

    if fragment.done {
        if let Some(reason) = &fragment.done_reason {
            tracing::debug!(%reason, "stream finished");
        }
        return Ok(true);
    }

    Ok(false)
}

impl Generate for Ollama {
    async fn fetch(&self, message: &str) -> Aggregate {
        if message.trim().is_empty() {
            return Aggregate {
                text: String::new(),
                complete: false,
                error: Some(StreamError::EmptyPrompt),
            };
        }

        let prompt = format!("User: {message}\nAssistant:");
        let mut text = String::new();

        let outcome = tokio::time::timeout(self.timeout, self.read_stream(prompt, &mut text)).await;

        match outcome {
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "generation deadline elapsed");
                Aggregate {
                    text,
                    complete: false,
                    error: Some(StreamError::Timeout),
                }
            }
            Ok(Err(e)) => Aggregate {
                text,
                complete: false,
                error: Some(e),
            },
            Ok(Ok(true)) => Aggregate {
                text,
                complete: true,
                error: None,
            },
            Ok(Ok(false)) => {
                tracing::warn!("stream closed without a done signal");
                Aggregate {
                    text,
                    complete: false,
                    error: Some(StreamError::TruncatedStream),
                }
            }
        }
    }
}
