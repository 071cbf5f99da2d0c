//! Client for the generativelanguage `generateContent` endpoint.
//!
//! One fixed sampling profile per entry point; callers do not tune
//! parameters. The API key travels as a query parameter and is never
//! logged. A missing key short-circuits before any network activity.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use mitra_core::config::{GeminiConfig, GEMINI_TIMEOUT_SECS};

use crate::advisor::CropAdvisor;
use crate::error::{GeminiError, Result};
use crate::prompt;
use crate::types::{
    GenerateRequest, GenerateResponse, GenerationConfig, Part, Turn, CHAT_PROFILE, VISION_PROFILE,
};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(GEMINI_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, key
        )
    }

    /// Issue one generateContent call and extract the first candidate's text.
    async fn generate(&self, contents: Vec<Turn>, profile: GenerationConfig) -> Result<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GeminiError::Unconfigured)?;

        let body = GenerateRequest {
            contents,
            generation_config: profile,
        };

        debug!(model = %self.model, "sending generateContent request");

        let resp = self
            .http
            .post(self.endpoint(key))
            .json(&body)
            .send()
            .await
            .map_err(GeminiError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), model = %self.model, "generateContent rejected");
            return Err(GeminiError::Api {
                status: status.as_u16(),
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = parsed.first_text();
        if text.is_empty() {
            return Err(GeminiError::Parse("response carried no text".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl CropAdvisor for GeminiClient {
    async fn chat(&self, turns: &[Turn], language: &str) -> Result<String> {
        if self.api_key.is_none() {
            return Err(GeminiError::Unconfigured);
        }
        let contents = prompt::inject_system_instruction(turns, language);
        self.generate(contents, CHAT_PROFILE).await
    }

    async fn analyze_image(
        &self,
        image_bytes: &[u8],
        mime_type: Option<&str>,
        question: &str,
    ) -> Result<String> {
        if self.api_key.is_none() {
            return Err(GeminiError::Unconfigured);
        }

        let mime = mime_type.unwrap_or("image/jpeg");
        let turn = Turn {
            role: crate::types::Role::User,
            parts: vec![
                Part::text(format!("{}\n\n{question}", prompt::PATHOLOGY_INSTRUCTION)),
                Part::inline(mime, STANDARD.encode(image_bytes)),
            ],
        };

        self.generate(vec![turn], VISION_PROFILE).await
    }

    async fn recommend_crops(
        &self,
        soil_type: &str,
        location: &str,
        season: &str,
    ) -> Result<String> {
        let prompt = prompt::crop_recommendation_prompt(soil_type, location, season);
        self.chat(&[Turn::user(prompt)], "English").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured_client() -> GeminiClient {
        GeminiClient::new(&GeminiConfig {
            api_key: None,
            // Nothing listens here — a network attempt would fail loudly
            // rather than short-circuiting with Unconfigured.
            base_url: "http://127.0.0.1:1".to_string(),
            ..GeminiConfig::default()
        })
    }

    #[tokio::test]
    async fn chat_without_key_short_circuits() {
        let client = unconfigured_client();
        let err = client
            .chat(&[Turn::user("hello")], "English")
            .await
            .expect_err("should not succeed");
        assert!(matches!(err, GeminiError::Unconfigured));
    }

    #[tokio::test]
    async fn analyze_image_without_key_short_circuits() {
        let client = unconfigured_client();
        let err = client
            .analyze_image(&[0xFF, 0xD8], None, "what disease is this")
            .await
            .expect_err("should not succeed");
        assert!(matches!(err, GeminiError::Unconfigured));
    }

    #[tokio::test]
    async fn recommend_crops_without_key_short_circuits() {
        let client = unconfigured_client();
        let err = client
            .recommend_crops("sandy", "Punjab", "kharif")
            .await
            .expect_err("should not succeed");
        assert!(matches!(err, GeminiError::Unconfigured));
    }

    #[test]
    fn endpoint_contains_model_and_key() {
        let client = GeminiClient::new(&GeminiConfig {
            api_key: Some("k123".to_string()),
            ..GeminiConfig::default()
        });
        let url = client.endpoint("k123");
        assert!(url.ends_with("gemini-2.0-flash:generateContent?key=k123"));
    }
}
