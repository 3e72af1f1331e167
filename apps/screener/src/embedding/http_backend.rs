use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EmbeddingBackend;
use crate::errors::ScreenError;

/// Client for an OpenAI-compatible `/embeddings` endpoint (hosted model or a
/// local sentence-transformer server). One batched request per call; the
/// per-call timeout is applied by the caller.
#[derive(Clone)]
pub struct HttpEmbeddingBackend {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbeddingBackend {
    pub fn new(url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbeddingBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ScreenError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| unavailable("backend returned no embedding"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ScreenError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| unavailable(&format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(&format!("status {status}: {body}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| unavailable(&format!("malformed response: {e}")))?;

        debug!("Embedded {} texts via {}", texts.len(), self.url);
        order_embeddings(parsed.data, texts.len())
    }
}

/// Puts embeddings back in request order and checks every input got one.
fn order_embeddings(
    mut data: Vec<EmbeddingDatum>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, ScreenError> {
    if data.len() != expected {
        return Err(unavailable(&format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(unavailable("embedding indices do not cover the request"));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

fn unavailable(message: &str) -> ScreenError {
    ScreenError::EmbeddingUnavailable(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_reordered_by_index() {
        let json = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        let ordered = order_embeddings(parsed.data, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_short_response_is_unavailable() {
        let data = vec![EmbeddingDatum {
            index: 0,
            embedding: vec![1.0],
        }];
        let err = order_embeddings(data, 2).unwrap_err();
        assert!(err.is_backend_outage());
    }

    #[test]
    fn test_duplicate_indices_rejected() {
        let data = vec![
            EmbeddingDatum {
                index: 0,
                embedding: vec![1.0],
            },
            EmbeddingDatum {
                index: 0,
                embedding: vec![2.0],
            },
        ];
        assert!(order_embeddings(data, 2).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let backend =
            HttpEmbeddingBackend::new("http://127.0.0.1:9/embeddings".into(), "m".into(), None);
        let err = backend.embed("rust").await.unwrap_err();
        assert_eq!(err.code(), "EMBEDDING_UNAVAILABLE");
    }
}
