pub mod confirmation;
pub mod controller;
pub mod error;
pub mod service;
pub mod session;
pub mod store;

pub use confirmation::{
    Confirmation, ConfirmationGate, ConfirmationPrompt, ConfirmationRequest, Decision,
};
pub use controller::{RemoveOutcome, SubmitOutcome, SyncController};
pub use error::{RemoteOperation, SyncError};
pub use service::{HttpItemService, RemoteItemService};
pub use session::{EditSession, EditTarget};
pub use store::ItemStore;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
