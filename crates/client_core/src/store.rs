use std::sync::Arc;

use shared::domain::{Item, ItemId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::{RemoteOperation, SyncError},
    service::RemoteItemService,
};

/// Local read replica of the remote item list.
///
/// The collection is only ever replaced wholesale by [`ItemStore::reload`];
/// there is no incremental patching. Subscribers are notified on every
/// replacement.
pub struct ItemStore {
    service: Arc<dyn RemoteItemService>,
    snapshot: watch::Sender<Arc<[Item]>>,
}

impl ItemStore {
    pub fn new(service: Arc<dyn RemoteItemService>) -> Self {
        let (snapshot, _) = watch::channel(Arc::<[Item]>::from(Vec::new()));
        Self { service, snapshot }
    }

    /// Fetches the full list and swaps it in. On failure the previous
    /// snapshot stays in place.
    pub async fn reload(&self) -> Result<Arc<[Item]>, SyncError> {
        let items = self.service.list_items().await.map_err(|source| {
            warn!(error = %source, "item reload failed; keeping previous snapshot");
            SyncError::network(RemoteOperation::List, source)
        })?;

        let items: Arc<[Item]> = items.into();
        self.snapshot.send_replace(items.clone());
        debug!(count = items.len(), "item collection replaced");
        Ok(items)
    }

    pub fn current(&self) -> Arc<[Item]> {
        self.snapshot.borrow().clone()
    }

    pub fn find(&self, item_id: ItemId) -> Option<Item> {
        self.snapshot
            .borrow()
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<[Item]>> {
        self.snapshot.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
