//! services/api/src/adapters/suggest_llm.rs
//!
//! This module contains the adapter for the activity-suggestion LLM.
//! It implements the `ActivityGenerator` port from the `core` crate.
//! Any failure here (network, quota, malformed output) surfaces as a
//! `PortError::Generation`, which the suggestion chain absorbs.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a helpful assistant for a daycare teacher.
You suggest simple, low-prep classroom activities.

Return the response strictly as a JSON array of objects with these keys:
- title (string)
- objective (string: compliance-safe, educational goal)
- description (string: brief instructions)
- materials (string: list of items)
- type (string: e.g., Art, Sensory, Outdoor, Music)

Do not include markdown code blocks. Just the raw JSON."#;

const USER_INPUT_TEMPLATE: &str = r#"Suggest 3 simple, low-prep activities for children in the age group: {age_group}.
The theme or topic is: {theme}.
Available materials (optional context): {materials}."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use kinderplan_core::ports::{
    ActivityGenerator, GeneratedActivity, PortError, PortResult, SuggestionRequest,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ActivityGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSuggestionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSuggestionAdapter {
    /// Creates a new `OpenAiSuggestionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Strips a surrounding markdown code fence, which some models emit even
/// when told not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

//=========================================================================================
// `ActivityGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl ActivityGenerator for OpenAiSuggestionAdapter {
    /// Requests a batch of activity suggestions and parses the raw JSON
    /// array out of the completion.
    async fn generate(&self, request: &SuggestionRequest) -> PortResult<Vec<GeneratedActivity>> {
        let user_input = USER_INPUT_TEMPLATE
            .replace("{age_group}", &request.age_group.to_string())
            .replace("{theme}", &request.theme)
            .replace("{materials}", &request.materials);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Generation(e.to_string()))?
                .into(),
        ];

        let completion_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Generation(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(completion_request)
            .await
            .map_err(|e: OpenAIError| PortError::Generation(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Generation("suggestion LLM returned no text content".to_string())
            })?;

        serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| PortError::Generation(format!("malformed suggestion payload: {e}")))
    }
}
