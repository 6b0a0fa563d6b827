use serde::{Deserialize, Serialize};

use crate::domain::ItemId;

/// Body of `POST /items` and `PUT /items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemNameRequest {
    pub name: String,
}

impl ItemNameRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub fn items_route() -> &'static str {
    "/items"
}

pub fn item_route(item_id: ItemId) -> String {
    format!("/items/{}", item_id.0)
}
