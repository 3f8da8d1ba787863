//! Persistence layer for installation progress

pub mod store;

pub use store::JsonFileStateStore;

use crate::core::ProgressState;
use anyhow::Result;

/// Trait for progress state backends
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Persist progress, replacing any earlier record
    async fn save(&self, state: &ProgressState) -> Result<()>;

    /// Load progress; `None` when nothing usable is stored
    async fn load(&self) -> Option<ProgressState>;

    /// Remove stored progress (no-op when absent)
    async fn clear(&self) -> Result<()>;
}

/// In-memory state store (for testing or ephemeral use)
pub struct InMemoryStateStore {
    state: tokio::sync::RwLock<Option<ProgressState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            state: tokio::sync::RwLock::new(None),
        }
    }

    /// Create a store that already holds progress
    pub fn with_state(state: ProgressState) -> Self {
        Self {
            state: tokio::sync::RwLock::new(Some(state)),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn save(&self, state: &ProgressState) -> Result<()> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }

    async fn load(&self) -> Option<ProgressState> {
        self.state.read().await.clone()
    }

    async fn clear(&self) -> Result<()> {
        *self.state.write().await = None;
        Ok(())
    }
}
