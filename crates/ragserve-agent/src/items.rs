//! Conversation item types
//!
//! These mirror the Responses-API item forms we care about: role-tagged
//! messages, function calls and their outputs. A stored history is an
//! ordered sequence of these items, replayed as model input on the next
//! turn.

use serde::{Deserialize, Serialize};

/// One entry of a conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationItem {
    Message {
        role: String,
        content: MessageContent,
    },
    FunctionCall {
        name: String,
        /// JSON-encoded arguments object, as the model emits it
        arguments: String,
        call_id: String,
    },
    FunctionCallOutput {
        call_id: String,
        output: String,
    },
}

/// Message content: plain text on input, typed parts on model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    InputText { text: String },
    OutputText { text: String },
    Refusal { refusal: String },
}

impl ConversationItem {
    /// A plain user message
    pub fn user(text: impl Into<String>) -> Self {
        ConversationItem::Message {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// Extract the text of an assistant message, if this is one
    pub fn assistant_text(&self) -> Option<String> {
        let ConversationItem::Message { role, content } = self else {
            return None;
        };
        if role != "assistant" {
            return None;
        }
        let text = match content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::InputText { text } | ContentPart::OutputText { text } => {
                        Some(text.as_str())
                    }
                    ContentPart::Refusal { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_serializes_as_input_item() {
        let item = ConversationItem::user("hello");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({"type": "message", "role": "user", "content": "hello"})
        );
    }

    #[test]
    fn test_output_message_deserializes_from_parts() {
        let value = json!({
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "output_text", "text": "the answer", "annotations": []}
            ],
            "status": "completed",
        });
        let item: ConversationItem = serde_json::from_value(value).unwrap();
        assert_eq!(item.assistant_text().as_deref(), Some("the answer"));
    }

    #[test]
    fn test_function_call_round_trip() {
        let value = json!({
            "type": "function_call",
            "name": "query_knowledge_base",
            "arguments": "{\"query_text\":\"who is ada\"}",
            "call_id": "call_1",
        });
        let item: ConversationItem = serde_json::from_value(value.clone()).unwrap();
        assert!(matches!(
            &item,
            ConversationItem::FunctionCall { name, .. } if name == "query_knowledge_base"
        ));
        assert!(item.assistant_text().is_none());

        let reencoded = serde_json::to_value(&item).unwrap();
        assert_eq!(reencoded, value);
    }
}
