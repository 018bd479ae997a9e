//! Budget assistant chat.

use async_trait::async_trait;
use budgetly_core::budget::BudgetSnapshot;
use budgetly_shared::{AppError, AppResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ApiClient, read_json};

/// First message of every conversation.
pub const GREETING: &str = "Hello! I'm your AI Budget Assistant. I can help you with:\n\n\
    \u{2022} Budget planning and advice\n\
    \u{2022} Expense management tips\n\
    \u{2022} Savings strategies\n\
    \u{2022} Debt management\n\n\
    What would you like to know?";

/// Shown in place of a reply when the assistant fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Shown after the history is cleared.
pub const CLEARED: &str = "Chat cleared! How can I help you with your budget today?";

/// Suggested prompts.
pub const QUICK_QUESTIONS: [&str; 5] = [
    "How can I save more money?",
    "Is my budget healthy?",
    "Where should I reduce spending?",
    "Tips for managing debt?",
    "What's the 50/30/20 rule?",
];

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The signed-in user.
    User,
    /// The assistant.
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: Role,
    /// Text.
    pub content: String,
}

impl ChatMessage {
    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The remote side of a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Asks one question about the given budget.
    async fn chat(&self, message: &str, budget: &BudgetSnapshot) -> AppResult<String>;

    /// Drops the server-side history.
    async fn clear(&self) -> AppResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    budget_data: &'a BudgetSnapshot,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `POST /api/ai/chat` and `DELETE /api/ai/chat/clear`.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    api: ApiClient,
}

impl AssistantClient {
    /// Creates a client over an existing connection.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ChatBackend for AssistantClient {
    async fn chat(&self, message: &str, budget: &BudgetSnapshot) -> AppResult<String> {
        let request = self
            .api
            .request(Method::POST, "/api/ai/chat")
            .json(&ChatRequest {
                message,
                budget_data: budget,
            });
        let body: ChatResponse = read_json(self.api.send_authorized(request).await?).await?;

        match body {
            ChatResponse {
                success: true,
                response: Some(reply),
                ..
            } => Ok(reply),
            ChatResponse { error, .. } => Err(AppError::Assistant(
                error.unwrap_or_else(|| "Failed to get response".to_string()),
            )),
        }
    }

    async fn clear(&self) -> AppResult<()> {
        self.api
            .send_authorized(self.api.request(Method::DELETE, "/api/ai/chat/clear"))
            .await?;
        Ok(())
    }
}

/// The chat transcript.
///
/// Failures never end the conversation: they append the fallback reply and
/// record the error, and the next `send` proceeds as usual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    error: Option<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A conversation holding only the greeting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            error: None,
        }
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The error from the last failed send, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Suggested prompts.
    #[must_use]
    pub const fn quick_questions() -> &'static [&'static str] {
        &QUICK_QUESTIONS
    }

    /// Sends `input` with the current budget and appends the reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the appended
    /// assistant message is returned, which is the fallback reply on
    /// failure.
    pub async fn send<B: ChatBackend + ?Sized>(
        &mut self,
        backend: &B,
        input: &str,
        budget: &BudgetSnapshot,
    ) -> Option<&ChatMessage> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage {
            role: Role::User,
            content: message.to_string(),
        });
        self.error = None;

        let reply = match backend.chat(message, budget).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error_code = e.error_code(), error = %e, "Assistant request failed");
                self.error = Some(e.user_message());
                FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(reply));
        self.messages.last()
    }

    /// Clears the server history, then resets the transcript.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the transcript is left as it was.
    pub async fn clear<B: ChatBackend + ?Sized>(&mut self, backend: &B) -> AppResult<()> {
        backend.clear().await?;
        self.messages = vec![ChatMessage::assistant(CLEARED)];
        self.error = None;
        info!("Chat cleared");
        Ok(())
    }
}
