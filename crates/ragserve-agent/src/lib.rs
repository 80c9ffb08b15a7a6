//! Conversational agent loop for ragserve
//!
//! This crate holds the Responses-API model client, the per-user
//! conversation store, the turn runner that drives tool calls to a final
//! answer, and the two tools the agent can reach for: the knowledge-base
//! query and the web fetch-and-store ingestion.

mod history;
mod items;
mod model;
mod runner;
mod tools;

pub use history::ConversationStore;
pub use items::{ContentPart, ConversationItem, MessageContent};
pub use model::{DEFAULT_MODEL, OpenAiResponsesModel, ResponsesModel};
pub use runner::{AGENT_INSTRUCTIONS, AgentRunner};
pub use tools::{KnowledgeBaseQueryTool, WebFetchTool};

// Re-export core types for convenience
pub use ragserve_core::{Error, Result, Tool, ToolRegistry, ToolSchema};
