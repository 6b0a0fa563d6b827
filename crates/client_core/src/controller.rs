use std::sync::Arc;

use shared::domain::{Item, ItemId};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    confirmation::{Confirmation, ConfirmationGate, ConfirmationPrompt, ConfirmationRequest},
    error::{RemoteOperation, SyncError},
    service::RemoteItemService,
    session::{EditSession, EditTarget},
    store::ItemStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server may or may not echo the created item back.
    Created(Option<Item>),
    Updated(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Cancelled,
}

/// Turns user commands into remote calls and keeps the item store and the
/// edit session consistent with their results.
///
/// Network commands are serialized: one issued while another is in flight
/// waits for it (mutation and reload) to finish. Local session edits never
/// wait.
pub struct SyncController {
    service: Arc<dyn RemoteItemService>,
    store: ItemStore,
    session: watch::Sender<EditSession>,
    gate: ConfirmationGate,
    command_lock: Mutex<()>,
}

impl SyncController {
    pub fn new(
        service: Arc<dyn RemoteItemService>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        let (session, _) = watch::channel(EditSession::new());
        Self {
            store: ItemStore::new(service.clone()),
            service,
            session,
            gate: ConfirmationGate::new(prompt),
            command_lock: Mutex::new(()),
        }
    }

    pub fn find(&self, item_id: ItemId) -> Option<Item> {
        self.store.find(item_id)
    }

    pub fn items(&self) -> Arc<[Item]> {
        self.store.current()
    }

    pub fn session(&self) -> EditSession {
        self.session.borrow().clone()
    }

    pub fn subscribe_items(&self) -> watch::Receiver<Arc<[Item]>> {
        self.store.subscribe()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<EditSession> {
        self.session.subscribe()
    }

    pub fn is_confirmation_pending(&self, item_id: ItemId) -> bool {
        self.gate.is_pending(item_id)
    }

    /// Loads the list from the server, e.g. when the view first opens.
    pub async fn refresh(&self) -> Result<Arc<[Item]>, SyncError> {
        let _command = self.command_lock.lock().await;
        self.store.reload().await
    }

    pub fn begin_create(&self) {
        self.session.send_modify(EditSession::start_create);
    }

    pub fn begin_edit(&self, item: &Item) {
        if let Some(previous) = self.session.borrow().editing_id() {
            if previous != item.id {
                debug!(
                    previous = previous.0,
                    item_id = item.id.0,
                    "replacing in-progress edit"
                );
            }
        }
        self.session.send_modify(|session| session.start_edit(item));
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.session.send_modify(|session| session.set_draft(text));
    }

    /// Creates or updates depending on the session target, then reloads and
    /// resets the session.
    ///
    /// A blank draft fails with [`SyncError::Validation`] before any remote
    /// call. A failed create/update leaves session and store untouched so
    /// the same draft can be resubmitted.
    pub async fn submit(&self) -> Result<SubmitOutcome, SyncError> {
        let _command = self.command_lock.lock().await;
        let session = self.session();
        let name = session.submittable_draft()?;

        let outcome = match session.target() {
            EditTarget::Creating => {
                let created = self
                    .service
                    .create_item(name)
                    .await
                    .map_err(|source| mutation_failed(RemoteOperation::Create, source))?;
                info!(
                    item_id = created.as_ref().map(|item| item.id.0),
                    "item created"
                );
                SubmitOutcome::Created(created)
            }
            EditTarget::Editing(item_id) => {
                self.service
                    .update_item(item_id, name)
                    .await
                    .map_err(|source| mutation_failed(RemoteOperation::Update(item_id), source))?;
                info!(item_id = item_id.0, "item updated");
                SubmitOutcome::Updated(item_id)
            }
        };

        // The mutation already happened; the session resets even if the
        // reload fails so the draft cannot be submitted twice.
        let reloaded = self.store.reload().await;
        self.session.send_modify(EditSession::reset);
        reloaded?;
        Ok(outcome)
    }

    /// Deletes `item_id` after the confirmation prompt accepts. Cancelling
    /// is not an error.
    pub async fn remove(&self, item_id: ItemId) -> Result<RemoveOutcome, SyncError> {
        let item_name = self.store.find(item_id).map(|item| item.name);
        let request = ConfirmationRequest::delete(item_id, item_name.as_deref());

        let confirmation = self
            .gate
            .confirm(request, || async move {
                let _command = self.command_lock.lock().await;
                self.service
                    .delete_item(item_id)
                    .await
                    .map_err(|source| mutation_failed(RemoteOperation::Delete(item_id), source))?;
                info!(item_id = item_id.0, "item deleted");
                self.store.reload().await?;
                Ok::<(), SyncError>(())
            })
            .await?;

        match confirmation {
            Confirmation::Accepted(result) => result.map(|()| RemoveOutcome::Deleted),
            Confirmation::Cancelled => Ok(RemoveOutcome::Cancelled),
        }
    }
}

fn mutation_failed(operation: RemoteOperation, source: anyhow::Error) -> SyncError {
    warn!(%operation, error = %source, "remote mutation failed");
    SyncError::network(operation, source)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
