use crate::domain::model::{Matching, Participant, Registry};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Delivers one notification for a matched pair. Any error is treated as a
/// retryable failure by the dispatch pool.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, source: &Participant, destination: &Participant) -> Result<()>;
}

/// Human gate between matching and dispatch.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, registry: &Registry, matching: &Matching) -> Result<bool>;
}
