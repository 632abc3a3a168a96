//! Completion signal shown when a background prefetch lands.

use async_trait::async_trait;
use tracing::info;

use crate::types::identity::PageIdentity;

/// Transient indicator raised after a successful cache write.
///
/// The coordinator calls `show` once per written bundle and `clear` after
/// the configured badge duration.
#[async_trait]
pub trait CompletionSignal: Send + Sync {
    async fn show(&self, identity: &PageIdentity);

    async fn clear(&self, identity: &PageIdentity);
}

/// Signal that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSignal;

#[async_trait]
impl CompletionSignal for NoopSignal {
    async fn show(&self, _identity: &PageIdentity) {}

    async fn clear(&self, _identity: &PageIdentity) {}
}

/// Signal that writes the badge transitions to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSignal;

#[async_trait]
impl CompletionSignal for LogSignal {
    async fn show(&self, identity: &PageIdentity) {
        info!(identity = %identity, "Summary ready");
    }

    async fn clear(&self, identity: &PageIdentity) {
        info!(identity = %identity, "Summary badge cleared");
    }
}
