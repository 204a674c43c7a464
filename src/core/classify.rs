// text classification - talks to the hugging face inference api

use crate::Error;
use serde::Deserialize;
use std::future::Future;

// what the classifier hands back for one message
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

// seam for the external classifier collaborator
pub trait Classify {
    fn classify(&self, text: &str) -> impl Future<Output = Result<Classification, Error>> + Send;
}

pub struct HuggingFace {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

// one {label, score} per candidate label
#[derive(Deserialize)]
struct Score {
    label: String,
    score: f32,
}

// newer inference deployments nest the scores one level deeper
#[derive(Deserialize)]
#[serde(untagged)]
enum Scores {
    Nested(Vec<Vec<Score>>),
    Flat(Vec<Score>),
}

impl HuggingFace {
    pub fn new(model: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("https://api-inference.huggingface.co/models/{model}"),
            token,
        }
    }
}

impl Classify for HuggingFace {
    async fn classify(&self, text: &str) -> Result<Classification, Error> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let error = response.text().await?;
            return Err(Error::Classifier(error));
        }

        let scores = match response.json::<Scores>().await? {
            Scores::Nested(mut nested) => {
                if nested.is_empty() {
                    Vec::new()
                } else {
                    nested.swap_remove(0)
                }
            }
            Scores::Flat(flat) => flat,
        };

        let top = scores
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| Error::Classifier("no labels in classifier output".to_string()))?;

        // a blank label or nonsense score means the collaborator is broken,
        // not that the message is safe
        if top.label.is_empty() {
            return Err(Error::Classifier("empty label in classifier output".to_string()));
        }
        if !(0.0..=1.0).contains(&top.score) {
            return Err(Error::Classifier(format!(
                "confidence {} out of range",
                top.score
            )));
        }

        Ok(Classification {
            label: top.label,
            confidence: top.score,
        })
    }
}
