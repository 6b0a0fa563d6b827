use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::str::FromStr;
use tracing::debug;

use shared::domain::{Item, ItemId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `:memory:` is its own database; keep exactly one alive.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        let storage = Self { pool };
        storage.ensure_items_table().await?;
        Ok(storage)
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_items_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure items table exists")?;
        Ok(())
    }

    /// Items in insertion order.
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query("SELECT id, name FROM items ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list items")?;
        rows.iter().map(item_from_row).collect()
    }

    pub async fn create_item(&self, name: &str) -> Result<Item> {
        let row = sqlx::query("INSERT INTO items (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("failed to insert item")?;
        let item = item_from_row(&row)?;
        debug!(item_id = item.id.0, "stored new item");
        Ok(item)
    }

    /// Returns `None` when no item with `item_id` exists.
    pub async fn update_item(&self, item_id: ItemId, name: &str) -> Result<Option<Item>> {
        let row = sqlx::query(
            "UPDATE items SET name = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?
             RETURNING id, name",
        )
        .bind(name)
        .bind(item_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update item {}", item_id.0))?;
        row.as_ref().map(item_from_row).transpose()
    }

    /// Returns whether a row was removed.
    pub async fn delete_item(&self, item_id: ItemId) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete item {}", item_id.0))?
            .rows_affected();
        Ok(removed > 0)
    }
}

fn item_from_row(row: &SqliteRow) -> Result<Item> {
    Ok(Item {
        id: ItemId(row.try_get::<i64, _>("id")?),
        name: row.try_get::<String, _>("name")?,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
