use shared::domain::{Item, ItemId};

use crate::error::SyncError;

/// What a submit will do with the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditTarget {
    #[default]
    Creating,
    Editing(ItemId),
}

/// Single-slot edit state: at most one item is being edited at a time.
///
/// Starting a new edit replaces whatever was in progress without warning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditSession {
    target: EditTarget,
    draft: String,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_create(&mut self) {
        self.target = EditTarget::Creating;
        self.draft.clear();
    }

    pub fn start_edit(&mut self, item: &Item) {
        self.target = EditTarget::Editing(item.id);
        self.draft = item.name.clone();
    }

    /// Stored verbatim; validation happens on submit.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn reset(&mut self) {
        self.target = EditTarget::Creating;
        self.draft.clear();
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.target, EditTarget::Editing(_))
    }

    pub fn target(&self) -> EditTarget {
        self.target
    }

    pub fn editing_id(&self) -> Option<ItemId> {
        match self.target {
            EditTarget::Editing(item_id) => Some(item_id),
            EditTarget::Creating => None,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The draft as it will be sent, or a validation error when it is blank.
    pub fn submittable_draft(&self) -> Result<&str, SyncError> {
        if self.draft.trim().is_empty() {
            return Err(SyncError::Validation("item name must not be empty".into()));
        }
        Ok(&self.draft)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
