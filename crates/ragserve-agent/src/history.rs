//! Per-user conversation store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::items::ConversationItem;

/// In-memory conversation histories, keyed by user id.
///
/// Histories live for the process lifetime and are replaced wholesale after
/// a completed turn. Concurrent turns for the same user are serialized via
/// `turn_lock`; turns for different users do not contend. The store is
/// constructed at process start and passed around by handle, never kept as
/// a module-level singleton.
#[derive(Default)]
pub struct ConversationStore {
    histories: RwLock<HashMap<String, Vec<ConversationItem>>>,
    turn_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored transcript for a user, empty if none exists
    pub fn history(&self, user_id: &str) -> Vec<ConversationItem> {
        self.histories
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the stored transcript for a user
    pub fn replace(&self, user_id: &str, items: Vec<ConversationItem>) {
        self.histories
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id.to_string(), items);
    }

    /// Remove the stored transcript for a user id.
    ///
    /// A blank id clears nothing; clearing an unknown id is a no-op.
    pub fn clear(&self, user_id: &str) -> String {
        let uid = user_id.trim();
        if uid.is_empty() {
            return "No user id given - nothing to clear.".to_string();
        }
        self.histories
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uid);
        format!("Conversation for '{uid}' cleared.")
    }

    /// Per-user mutex serializing turns for the same user id
    pub fn turn_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.turn_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }
}
