use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::GenerationConfig;
use crate::core::errors::ChatError;

use super::provider::LlmProvider;

/// Google Generative Language API client (Gemini generation + embeddings).
#[derive(Clone)]
pub struct GeminiProvider {
    base_url: String,
    generation_model: String,
    embedding_model: String,
    temperature: f32,
    api_key: String,
    client: Client,
}

impl GeminiProvider {
    /// Reads the API key from the environment variable named in the config.
    /// A missing key is a configuration error and aborts startup.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ChatError::InvalidConfig(format!(
                "{} is not set; add the API key to the environment",
                config.api_key_env
            ))
        })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            generation_model: strip_models_prefix(&config.generation_model),
            embedding_model: strip_models_prefix(&config.embedding_model),
            temperature: config.temperature,
            api_key,
            client: Client::new(),
        })
    }
}

fn strip_models_prefix(model: &str) -> String {
    model.trim_start_matches("models/").to_string()
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.generation_model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ChatError::generation)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ChatError::GenerationFailure(format!(
                "Gemini generateContent returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ChatError::generation)?;

        let content = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                ChatError::GenerationFailure("Gemini response had no text candidate".to_string())
            })?;

        Ok(content)
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ChatError> {
        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents",
            self.base_url, self.embedding_model
        );

        let requests: Vec<Value> = inputs
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{}", self.embedding_model),
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(ChatError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ChatError::EmbeddingFailure(format!(
                "Gemini batchEmbedContents returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ChatError::embedding)?;

        let embeddings = payload["embeddings"]
            .as_array()
            .ok_or_else(|| {
                ChatError::EmbeddingFailure("Gemini response had no embeddings array".to_string())
            })?
            .iter()
            .map(|item| {
                item["values"]
                    .as_array()
                    .map(|vals| {
                        vals.iter()
                            .filter_map(|v| v.as_f64().map(|f| f as f32))
                            .collect::<Vec<f32>>()
                    })
                    .ok_or_else(|| {
                        ChatError::EmbeddingFailure(
                            "Gemini embedding entry had no values".to_string(),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if embeddings.len() != inputs.len() {
            return Err(ChatError::EmbeddingFailure(format!(
                "Gemini returned {} embeddings for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}
