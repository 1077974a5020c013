pub mod openai;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::ConversationMessage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl From<&ConversationMessage> for Message {
    fn from(msg: &ConversationMessage) -> Self {
        Self {
            role: msg.role.clone(),
            content: msg.content.clone(),
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}
