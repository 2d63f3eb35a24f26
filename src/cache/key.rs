//! Cache key generation.

use crate::types::{Message, ToolDefinition};
use crate::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Immutable fingerprint of a chat request.
///
/// Two semantically equal requests always produce an equal key: hashing goes
/// through canonical JSON (struct fields in declaration order, object keys
/// sorted), so map iteration order cannot leak into the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: String,
    pub model: String,
    pub messages_hash: String,
    pub tools_hash: Option<String>,
    pub response_format_hash: Option<String>,
}

impl CacheKey {
    /// Create a cache key from request parameters.
    pub fn create(
        provider: impl Into<String>,
        model: impl Into<String>,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        response_format: Option<&serde_json::Value>,
    ) -> Result<Self> {
        Ok(Self {
            provider: provider.into(),
            model: model.into(),
            messages_hash: hash_data(&messages)?,
            tools_hash: match tools {
                Some(tools) if !tools.is_empty() => Some(hash_data(&tools)?),
                _ => None,
            },
            response_format_hash: match response_format {
                Some(format) => Some(hash_data(format)?),
                None => None,
            },
        })
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.provider, self.model, self.messages_hash)?;
        if let Some(ref tools) = self.tools_hash {
            write!(f, "|t:{}", tools)?;
        }
        if let Some(ref format) = self.response_format_hash {
            write!(f, "|rf:{}", format)?;
        }
        Ok(())
    }
}

/// SHA-256 over canonical JSON, truncated to 16 hex chars.
fn hash_data<T: Serialize>(data: &T) -> Result<String> {
    let canonical = serde_json::to_vec(data)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{:02x}", byte));
    }
    Ok(hex)
}
