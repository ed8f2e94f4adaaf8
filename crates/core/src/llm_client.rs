use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use std::time::Duration;

/// One completed user/assistant round, kept as conversation memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub reply: String,
}

/// Upper bound on a single generation call. A model that takes longer than
/// this is reported as a failure instead of suspending the session forever.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// A generic client for the conversational model behind the resolver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Produces a reply to `input`, conditioned on the prior exchanges.
    async fn generate(&self, input: &str, history: &[Exchange]) -> Result<String>;
}

/// An implementation of `GenerativeModel` for any OpenAI-compatible API.
pub struct OpenAICompatibleModel {
    client: Client<OpenAIConfig>,
    model: String,
    persona: String,
}

impl OpenAICompatibleModel {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o-mini").
    /// * `persona` - The system prompt establishing the assistant's voice.
    pub fn new(config: OpenAIConfig, model: String, persona: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            persona,
        }
    }
}

#[async_trait]
impl GenerativeModel for OpenAICompatibleModel {
    async fn generate(&self, input: &str, history: &[Exchange]) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.persona.clone())
                .build()?
                .into(),
        ];
        for exchange in history {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(exchange.user.clone())
                    .build()?
                    .into(),
            );
            messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(exchange.reply.clone())
                    .build()?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(input.to_string())
                .build()?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = tokio::time::timeout(GENERATION_TIMEOUT, self.client.chat().create(request))
            .await
            .context("Generation timed out")??;

        let reply = response
            .choices
            .first()
            .context("No response choice from model")?
            .message
            .content
            .as_ref()
            .context("No content in model response")?
            .trim()
            .to_string();

        Ok(reply)
    }
}
