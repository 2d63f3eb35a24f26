//! Tool definitions and tool calls.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as parsed JSON; adapters deliver them already decoded.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Build a tool call, generating a `call_` id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Result<Self> {
        Self::with_id(generate_call_id(), name, arguments)
    }

    /// Build a tool call with the provider-assigned id.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Validation("tool call name must not be empty".into()));
        }
        if !arguments.is_object() {
            return Err(Error::Validation(
                "tool call arguments must be a JSON object".into(),
            ));
        }
        Ok(Self {
            id: id.into(),
            name,
            arguments,
        })
    }
}

/// A tool exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool parameters.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Result<Self> {
        let name = name.into();
        let description = description.into();
        if name.is_empty() {
            return Err(Error::Validation("tool name must not be empty".into()));
        }
        if description.is_empty() {
            return Err(Error::Validation(
                "tool description must not be empty".into(),
            ));
        }
        Ok(Self {
            name,
            description,
            parameters,
        })
    }
}

fn generate_call_id() -> String {
    format!("call_{}", &Uuid::new_v4().simple().to_string()[..12])
}
