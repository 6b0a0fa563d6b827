use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use shared::domain::ItemId;
use tracing::{debug, info, warn};

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Cancel,
}

/// What the user is asked before a destructive action runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub item_id: ItemId,
    pub title: String,
    pub message: String,
}

impl ConfirmationRequest {
    pub fn delete(item_id: ItemId, item_name: Option<&str>) -> Self {
        let message = match item_name {
            Some(name) => format!("Do you really want to delete \"{name}\"?"),
            None => format!("Do you really want to delete item {item_id}?"),
        };
        Self {
            item_id,
            title: "Confirm delete".to_string(),
            message,
        }
    }
}

/// Presentation of the accept/cancel decision (dialog, terminal prompt, ...).
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn ask(&self, request: &ConfirmationRequest) -> Decision;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<T> {
    Accepted(T),
    Cancelled,
}

/// Suspends a destructive action until the prompt reports a decision.
///
/// At most one confirmation per item can be outstanding. The item stays
/// pending until the accepted action has finished, so a repeated request
/// for the same item is rejected with [`SyncError::ConfirmationPending`]
/// without prompting again.
pub struct ConfirmationGate {
    prompt: Arc<dyn ConfirmationPrompt>,
    pending: Mutex<HashSet<ItemId>>,
}

impl ConfirmationGate {
    pub fn new(prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        Self {
            prompt,
            pending: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_pending(&self, item_id: ItemId) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&item_id)
    }

    /// Runs `on_accept` once if the prompt accepts; does nothing on cancel.
    pub async fn confirm<F, Fut, T>(
        &self,
        request: ConfirmationRequest,
        on_accept: F,
    ) -> Result<Confirmation<T>, SyncError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
    {
        let _pending = self.register(request.item_id)?;

        match self.prompt.ask(&request).await {
            Decision::Accept => {
                info!(item_id = request.item_id.0, "destructive action confirmed");
                Ok(Confirmation::Accepted(on_accept().await))
            }
            Decision::Cancel => {
                debug!(item_id = request.item_id.0, "destructive action cancelled");
                Ok(Confirmation::Cancelled)
            }
        }
    }

    fn register(&self, item_id: ItemId) -> Result<PendingGuard<'_>, SyncError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(item_id) {
            warn!(item_id = item_id.0, "confirmation already pending; rejecting request");
            return Err(SyncError::ConfirmationPending(item_id));
        }
        Ok(PendingGuard {
            pending: &self.pending,
            item_id,
        })
    }
}

/// Clears the pending marker when the confirmation finishes or is dropped.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<ItemId>>,
    item_id: ItemId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.item_id);
    }
}

#[cfg(test)]
#[path = "tests/confirmation_tests.rs"]
mod tests;
