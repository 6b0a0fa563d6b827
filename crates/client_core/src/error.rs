use std::fmt;

use shared::domain::ItemId;
use thiserror::Error;

/// The remote call that failed, carried by [`SyncError::Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    List,
    Create,
    Update(ItemId),
    Delete(ItemId),
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list items"),
            Self::Create => write!(f, "create item"),
            Self::Update(item_id) => write!(f, "update item {item_id}"),
            Self::Delete(item_id) => write!(f, "delete item {item_id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid draft: {0}")]
    Validation(String),
    #[error("{operation} failed: {source}")]
    Network {
        operation: RemoteOperation,
        source: anyhow::Error,
    },
    #[error("a delete confirmation for item {0} is already pending")]
    ConfirmationPending(ItemId),
}

impl SyncError {
    pub(crate) fn network(operation: RemoteOperation, source: anyhow::Error) -> Self {
        Self::Network { operation, source }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// The failed remote call, if this is a network failure.
    pub fn operation(&self) -> Option<RemoteOperation> {
        match self {
            Self::Network { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
