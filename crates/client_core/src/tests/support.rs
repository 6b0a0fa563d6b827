use std::{collections::VecDeque, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{Item, ItemId};
use tokio::sync::{oneshot, Mutex};

use crate::{ConfirmationPrompt, ConfirmationRequest, Decision, RemoteItemService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedCall {
    List,
    Create(String),
    Update(ItemId, String),
    Delete(ItemId),
}

/// In-memory backend that records every call in order.
pub(crate) struct FakeItemService {
    items: Mutex<Vec<Item>>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<RecordedCall>>,
    fail_list: Mutex<bool>,
    fail_mutations: Mutex<bool>,
    echo_items: bool,
    mutation_delay: Option<Duration>,
}

impl FakeItemService {
    pub(crate) fn with_items(items: Vec<Item>) -> Self {
        let next_id = items.iter().map(|item| item.id.0).max().unwrap_or(0) + 1;
        Self {
            items: Mutex::new(items),
            next_id: Mutex::new(next_id),
            calls: Mutex::new(Vec::new()),
            fail_list: Mutex::new(false),
            fail_mutations: Mutex::new(false),
            echo_items: true,
            mutation_delay: None,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::with_items(Vec::new())
    }

    /// Mutations answer with an empty body instead of the item.
    pub(crate) fn without_echo(mut self) -> Self {
        self.echo_items = false;
        self
    }

    pub(crate) fn with_mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = Some(delay);
        self
    }

    pub(crate) async fn set_fail_list(&self, fail: bool) {
        *self.fail_list.lock().await = fail;
    }

    pub(crate) async fn set_fail_mutations(&self, fail: bool) {
        *self.fail_mutations.lock().await = fail;
    }

    pub(crate) async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn server_items(&self) -> Vec<Item> {
        self.items.lock().await.clone()
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.lock().await.push(call);
    }

    async fn before_mutation(&self) -> Result<()> {
        if let Some(delay) = self.mutation_delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_mutations.lock().await {
            return Err(anyhow!("server returned 500"));
        }
        Ok(())
    }

    fn echo(&self, item: Item) -> Option<Item> {
        self.echo_items.then_some(item)
    }
}

#[async_trait]
impl RemoteItemService for FakeItemService {
    async fn list_items(&self) -> Result<Vec<Item>> {
        self.record(RecordedCall::List).await;
        if *self.fail_list.lock().await {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.items.lock().await.clone())
    }

    async fn create_item(&self, name: &str) -> Result<Option<Item>> {
        self.record(RecordedCall::Create(name.to_string())).await;
        self.before_mutation().await?;
        let mut next_id = self.next_id.lock().await;
        let item = Item::new(*next_id, name);
        *next_id += 1;
        self.items.lock().await.push(item.clone());
        Ok(self.echo(item))
    }

    async fn update_item(&self, item_id: ItemId, name: &str) -> Result<Option<Item>> {
        self.record(RecordedCall::Update(item_id, name.to_string()))
            .await;
        self.before_mutation().await?;
        let mut items = self.items.lock().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| anyhow!("server returned 404"))?;
        item.name = name.to_string();
        Ok(self.echo(item.clone()))
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<()> {
        self.record(RecordedCall::Delete(item_id)).await;
        self.before_mutation().await?;
        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            return Err(anyhow!("server returned 404"));
        }
        Ok(())
    }
}

/// Answers prompts from a fixed script and remembers what was asked.
pub(crate) struct ScriptedPrompt {
    decisions: Mutex<VecDeque<Decision>>,
    asked: Mutex<Vec<ConfirmationRequest>>,
}

impl ScriptedPrompt {
    pub(crate) fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn accepting() -> Self {
        Self::new([])
    }

    pub(crate) async fn asked(&self) -> Vec<ConfirmationRequest> {
        self.asked.lock().await.clone()
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn ask(&self, request: &ConfirmationRequest) -> Decision {
        self.asked.lock().await.push(request.clone());
        // Accept once the script runs out.
        self.decisions
            .lock()
            .await
            .pop_front()
            .unwrap_or(Decision::Accept)
    }
}

/// Keeps the first prompt open until the test answers it.
pub(crate) struct HeldPrompt {
    opened: Mutex<Option<oneshot::Sender<ConfirmationRequest>>>,
    answer: Mutex<Option<oneshot::Receiver<Decision>>>,
}

impl HeldPrompt {
    /// Returns the prompt, a receiver fired when it is opened, and the
    /// sender used to answer it.
    pub(crate) fn new() -> (
        Self,
        oneshot::Receiver<ConfirmationRequest>,
        oneshot::Sender<Decision>,
    ) {
        let (opened_tx, opened_rx) = oneshot::channel();
        let (answer_tx, answer_rx) = oneshot::channel();
        let prompt = Self {
            opened: Mutex::new(Some(opened_tx)),
            answer: Mutex::new(Some(answer_rx)),
        };
        (prompt, opened_rx, answer_tx)
    }
}

#[async_trait]
impl ConfirmationPrompt for HeldPrompt {
    async fn ask(&self, request: &ConfirmationRequest) -> Decision {
        // Only the first request is held; later ones are cancelled.
        let answer = self.answer.lock().await.take();
        if let Some(opened) = self.opened.lock().await.take() {
            let _ = opened.send(request.clone());
        }
        let Some(answer) = answer else {
            return Decision::Cancel;
        };
        answer.await.unwrap_or(Decision::Cancel)
    }
}
