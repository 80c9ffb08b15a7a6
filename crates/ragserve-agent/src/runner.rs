//! Agent turn runner

use std::sync::Arc;

use ragserve_core::{Error, Result, ToolRegistry};

use crate::history::ConversationStore;
use crate::items::ConversationItem;
use crate::model::ResponsesModel;

/// Standing instructions handed to the model on every turn
pub const AGENT_INSTRUCTIONS: &str = "You are a helpful assistant in a \
retrieval-augmented system.\n\
Procedure:\n\
1) Always call 'query_knowledge_base' with the user's question first.\n\
2) If there are no useful hits, call 'web_fetch_and_store' with an \
unambiguous URL, then query the knowledge base again.\n\
3) Always produce a clear, complete final answer and cite the relevant \
sources (metadata 'source').";

/// Upper bound on model round-trips within one turn
const MAX_MODEL_ROUNDS: usize = 10;

/// Drives one turn of dialogue: replay stored history, let the model call
/// tools until it settles on an answer, then commit the new transcript.
pub struct AgentRunner<M: ResponsesModel> {
    model: M,
    registry: ToolRegistry,
    conversations: Arc<ConversationStore>,
    instructions: String,
}

impl<M: ResponsesModel> AgentRunner<M> {
    pub fn new(model: M, registry: ToolRegistry, conversations: Arc<ConversationStore>) -> Self {
        Self {
            model,
            registry,
            conversations,
            instructions: AGENT_INSTRUCTIONS.to_string(),
        }
    }

    /// Override the agent instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Run one turn for `user_id` and return the final answer text.
    ///
    /// History is committed only after the whole run succeeds; any failure
    /// propagates to the caller and leaves the stored history untouched.
    pub async fn run_turn(&self, user_id: &str, message: &str) -> Result<String> {
        let lock = self.conversations.turn_lock(user_id);
        let _turn = lock.lock().await;

        let mut transcript = self.conversations.history(user_id);
        transcript.push(ConversationItem::user(message));

        let schemas = self.registry.schemas();
        let mut final_answer = None;

        for round in 0..MAX_MODEL_ROUNDS {
            let output = self
                .model
                .respond(&self.instructions, &transcript, &schemas)
                .await?;

            let calls: Vec<(String, String, String)> = output
                .iter()
                .filter_map(|item| match item {
                    ConversationItem::FunctionCall {
                        name,
                        arguments,
                        call_id,
                    } => Some((name.clone(), arguments.clone(), call_id.clone())),
                    _ => None,
                })
                .collect();

            let answer = output.iter().rev().find_map(|item| item.assistant_text());
            transcript.extend(output);

            if calls.is_empty() {
                final_answer = answer;
                break;
            }

            for (name, arguments, call_id) in calls {
                tracing::info!(tool = %name, round, "invoking tool");
                let output = match serde_json::from_str(&arguments) {
                    Ok(arguments) => self.registry.invoke(&name, arguments).await,
                    Err(e) => format!("Invalid tool arguments: {e}"),
                };
                transcript.push(ConversationItem::FunctionCallOutput { call_id, output });
            }
        }

        let answer = final_answer.ok_or_else(|| {
            Error::Agent(format!(
                "no final answer after {MAX_MODEL_ROUNDS} model rounds"
            ))
        })?;

        self.conversations.replace(user_id, transcript);
        Ok(answer)
    }

    /// Remove the stored history for a user id, returning a confirmation
    pub fn clear_conversation(&self, user_id: &str) -> String {
        self.conversations.clear(user_id)
    }
}
