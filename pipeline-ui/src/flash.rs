//! One-shot status messages shown on the next page render
//!
//! The tracker has a single operator, so messages live in one process-wide
//! queue rather than per session.

use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct FlashQueue {
    messages: Arc<RwLock<Vec<String>>>,
}

impl FlashQueue {
    /// Queue a message for the next page
    pub async fn push(&self, message: impl Into<String>) {
        self.messages.write().await.push(message.into());
    }

    /// Take every queued message, oldest first
    pub async fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.write().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_empties_queue() {
        let flash = FlashQueue::default();
        flash.push("Category added.").await;
        flash.push(String::from("Job added.")).await;

        assert_eq!(flash.drain().await, vec!["Category added.", "Job added."]);
        assert!(flash.drain().await.is_empty());
    }
}
