use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Item, ItemId},
    protocol::{item_route, items_route, ItemNameRequest},
};
use tracing::debug;
use url::Url;

/// Remote list/create/update/delete calls against the item backend.
///
/// Any transport failure or non-2xx status is reported as an opaque error.
/// Mutations may return the affected item when the server sends one back.
#[async_trait]
pub trait RemoteItemService: Send + Sync {
    async fn list_items(&self) -> Result<Vec<Item>>;
    async fn create_item(&self, name: &str) -> Result<Option<Item>>;
    async fn update_item(&self, item_id: ItemId, name: &str) -> Result<Option<Item>>;
    async fn delete_item(&self, item_id: ItemId) -> Result<()>;
}

pub struct HttpItemService {
    http: Client,
    base_url: Url,
}

impl HttpItemService {
    pub fn new(server_url: &str, request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;
        Self::with_client(server_url, http)
    }

    pub fn with_client(server_url: &str, http: Client) -> Result<Self> {
        let mut base_url =
            Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("server url '{server_url}' cannot carry a path"));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        self.base_url
            .join(route.trim_start_matches('/'))
            .with_context(|| format!("invalid endpoint '{route}'"))
    }
}

#[async_trait]
impl RemoteItemService for HttpItemService {
    async fn list_items(&self) -> Result<Vec<Item>> {
        let items: Vec<Item> = self
            .http
            .get(self.endpoint(items_route())?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid item list payload from server")?;
        debug!(count = items.len(), "fetched item list");
        Ok(items)
    }

    async fn create_item(&self, name: &str) -> Result<Option<Item>> {
        let response = self
            .http
            .post(self.endpoint(items_route())?)
            .json(&ItemNameRequest::new(name))
            .send()
            .await?
            .error_for_status()?;
        optional_item(response).await
    }

    async fn update_item(&self, item_id: ItemId, name: &str) -> Result<Option<Item>> {
        let response = self
            .http
            .put(self.endpoint(&item_route(item_id))?)
            .json(&ItemNameRequest::new(name))
            .send()
            .await?
            .error_for_status()?;
        optional_item(response).await
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<()> {
        self.http
            .delete(self.endpoint(&item_route(item_id))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Servers may answer a mutation with the item, an empty body or some other
/// acknowledgement. Any 2xx is success; only an `Item` body is surfaced.
async fn optional_item(response: Response) -> Result<Option<Item>> {
    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice(&body) {
        Ok(item) => Ok(Some(item)),
        Err(error) => {
            debug!(%error, "mutation response is not an item; ignoring body");
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
