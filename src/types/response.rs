//! Chat responses and streaming chunks.

use crate::types::message::TokenUsage;
use crate::types::tool::ToolCall;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// A complete (non-streaming) chat response from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub provider: String,
    pub usage: TokenUsage,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: String,
    pub created_at: SystemTime,
}

impl ChatResponse {
    pub fn new(
        content: impl Into<String>,
        model: impl Into<String>,
        provider: impl Into<String>,
        usage: TokenUsage,
    ) -> Result<Self> {
        let model = model.into();
        let provider = provider.into();
        if model.is_empty() {
            return Err(Error::Validation("response model must not be empty".into()));
        }
        if provider.is_empty() {
            return Err(Error::Validation(
                "response provider must not be empty".into(),
            ));
        }
        Ok(Self {
            id: format!("resp_{}", &Uuid::new_v4().simple().to_string()[..12]),
            content: content.into(),
            model,
            provider,
            usage,
            tool_calls: Vec::new(),
            finish_reason: "stop".into(),
            created_at: SystemTime::now(),
        })
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_finish_reason(mut self, finish_reason: impl Into<String>) -> Self {
        self.finish_reason = finish_reason.into();
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One streaming delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Usage arrives on the final chunk for most providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ChatChunk {
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: Some(delta.into()),
            ..Self::default()
        }
    }

    pub fn has_content(&self) -> bool {
        self.delta.as_ref().map(|d| !d.is_empty()).unwrap_or(false)
    }

    pub fn has_tool_call(&self) -> bool {
        self.tool_call.is_some()
    }
}
