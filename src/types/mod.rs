//! 领域值对象：消息、工具调用、请求与响应的纯数据记录。
//!
//! Domain records shared by the resilience layer and provider adapters.
//! These are plain validated values: constructors enforce the invariants and
//! the types carry no behavior beyond derived accessors.

pub mod message;
pub mod request;
pub mod response;
pub mod tool;

pub use message::{Message, MessageRole, TokenUsage};
pub use request::ChatRequest;
pub use response::{ChatChunk, ChatResponse};
pub use tool::{ToolCall, ToolDefinition};
