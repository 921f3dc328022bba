//! Bounded per-user conversation memory.
//!
//! Histories live only for the lifetime of the process. Each user gets its
//! own lock so unrelated conversations never wait on each other, while
//! appends for one user are serialized.

use sardonic_core::Turn;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type History = Arc<Mutex<VecDeque<Turn>>>;

pub struct ConversationStore {
    cap: usize,
    histories: RwLock<HashMap<String, History>>,
}

impl ConversationStore {
    /// Create a store keeping at most `cap` turns per user (minimum 1).
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            histories: RwLock::new(HashMap::new()),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    async fn existing(&self, user_id: &str) -> Option<History> {
        self.histories.read().await.get(user_id).cloned()
    }

    async fn get_or_create(&self, user_id: &str) -> History {
        if let Some(history) = self.existing(user_id).await {
            return history;
        }
        let mut map = self.histories.write().await;
        map.entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::with_capacity(self.cap))))
            .clone()
    }

    /// Snapshot of a user's history, oldest first. Empty for unseen users.
    pub async fn read(&self, user_id: &str) -> Vec<Turn> {
        match self.existing(user_id).await {
            Some(history) => history.lock().await.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Append a turn, evicting the oldest turns once over the cap.
    pub async fn append(&self, user_id: &str, turn: Turn) {
        // The map lock is released before the per-user lock is taken.
        let history = self.get_or_create(user_id).await;
        let mut turns = history.lock().await;
        turns.push_back(turn);
        while turns.len() > self.cap {
            turns.pop_front();
        }
        tracing::debug!("History for {} now {} turns", user_id, turns.len());
    }

    pub async fn clear(&self, user_id: &str) {
        if let Some(history) = self.existing(user_id).await {
            history.lock().await.clear();
            tracing::debug!("Cleared history for {}", user_id);
        }
    }

    /// Number of users with at least one stored turn.
    pub async fn active_users(&self) -> usize {
        let histories: Vec<History> = self.histories.read().await.values().cloned().collect();
        let mut active = 0;
        for history in histories {
            if !history.lock().await.is_empty() {
                active += 1;
            }
        }
        active
    }

    pub async fn total_turns(&self) -> usize {
        let histories: Vec<History> = self.histories.read().await.values().cloned().collect();
        let mut total = 0;
        for history in histories {
            total += history.lock().await.len();
        }
        total
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(15)
    }
}
