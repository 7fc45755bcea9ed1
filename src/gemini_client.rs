use async_trait::async_trait;
use eyre::{Result, eyre};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::cli::chat::conversation_state::{Message, Role};
use crate::cli::chat::pipeline::LanguageModel;
use crate::config::Config;

pub struct GeminiClient {
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            temperature: config.gemini_temperature,
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate_content(&self, messages: &[Message]) -> Result<String> {
        let api_url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        // Format messages for the API. Gemini has no dedicated system role,
        // so system instructions are sent as user content.
        let formatted_messages = messages
            .iter()
            .map(|message| {
                json!({
                    "role": role_name(message.role),
                    "parts": [
                        {
                            "text": message.content
                        }
                    ]
                })
            })
            .collect::<Vec<_>>();

        let request_body = json!({
            "contents": formatted_messages,
            "generationConfig": {
                "temperature": self.temperature
            }
        });

        debug!(
            "Sending request to Gemini API: {}",
            serde_json::to_string_pretty(&request_body)?
        );

        let response = self.client.post(&api_url).json(&request_body).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            error!("API request failed with response: {}", error_text);
            return Err(eyre!("API request failed: {}", error_text));
        }

        let response_json: Value = response.json().await?;

        debug!(
            "Received response from Gemini API: {}",
            serde_json::to_string_pretty(&response_json)?
        );

        extract_candidate_text(&response_json)
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User | Role::System => "user",
        Role::Assistant => "model",
    }
}

/// Pull the text out of the first candidate, concatenating multi-part
/// responses. A response without any text is an error.
fn extract_candidate_text(response: &Value) -> Result<String> {
    let parts = response
        .get("candidates")
        .and_then(|candidates| candidates.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .ok_or_else(|| eyre!("Gemini response contained no candidates"))?;

    let mut result = String::new();

    for part in parts {
        if let Some(text) = part.get("text").and_then(|text| text.as_str()) {
            result.push_str(text);
        }
    }

    if result.is_empty() {
        return Err(eyre!("Gemini response contained no text content"));
    }

    Ok(result)
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        self.generate_content(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_concatenates_candidate_parts() {
        let response = json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "Portugal " },
                            { "text": "beaches" }
                        ]
                    }
                }
            ]
        });

        let text = extract_candidate_text(&response).unwrap();
        assert_eq!(text, "Portugal beaches");
    }

    #[test]
    fn rejects_response_without_candidates() {
        let response = json!({ "promptFeedback": {} });
        assert!(extract_candidate_text(&response).is_err());
    }

    #[test]
    fn rejects_candidate_without_text() {
        let response = json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "inlineData": { "mimeType": "image/png" } }
                        ]
                    }
                }
            ]
        });
        assert!(extract_candidate_text(&response).is_err());
    }

    #[test]
    fn system_and_user_roles_map_to_gemini_user() {
        assert_eq!(role_name(Role::System), "user");
        assert_eq!(role_name(Role::User), "user");
        assert_eq!(role_name(Role::Assistant), "model");
    }
}
