use shared::{
    domain::{Item, ItemId},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_items(ctx: &ApiContext) -> Result<Vec<Item>, ApiError> {
    ctx.storage.list_items().await.map_err(internal)
}

pub async fn create_item(ctx: &ApiContext, name: &str) -> Result<Item, ApiError> {
    validate_name(name)?;
    let item = ctx.storage.create_item(name).await.map_err(internal)?;
    info!(item_id = item.id.0, "item created");
    Ok(item)
}

pub async fn update_item(ctx: &ApiContext, item_id: ItemId, name: &str) -> Result<Item, ApiError> {
    validate_name(name)?;
    let item = ctx
        .storage
        .update_item(item_id, name)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(item_id))?;
    info!(item_id = item.id.0, "item renamed");
    Ok(item)
}

pub async fn delete_item(ctx: &ApiContext, item_id: ItemId) -> Result<(), ApiError> {
    let removed = ctx.storage.delete_item(item_id).await.map_err(internal)?;
    if !removed {
        return Err(not_found(item_id));
    }
    info!(item_id = item_id.0, "item deleted");
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "item name must not be empty",
        ));
    }
    Ok(())
}

fn not_found(item_id: ItemId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("item {} not found", item_id.0))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
