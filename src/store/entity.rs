//! Lazily populated entity cache with per-key fetch coalescing

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::core::{LookupError, RpcError};
use crate::domain::{Block, Transaction};
use crate::infrastructure::rpc::RpcClient;

/// Node error code for "no such block / transaction"
const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

/// An immutable entity fetched from the node by its hash.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// Name used in logs and errors
    const KIND: &'static str;
    /// RPC method that fetches one entity
    const METHOD: &'static str;

    fn params(key: &str) -> Vec<Value>;
}

impl Entity for Block {
    const KIND: &'static str = "block";
    const METHOD: &'static str = "getblock";

    fn params(key: &str) -> Vec<Value> {
        vec![Value::from(key)]
    }
}

impl Entity for Transaction {
    const KIND: &'static str = "transaction";
    const METHOD: &'static str = "getrawtransaction";

    fn params(key: &str) -> Vec<Value> {
        vec![Value::from(key), Value::Bool(true)]
    }
}

type Slot<E> = Arc<OnceCell<Arc<E>>>;

/// Cache of entities keyed by hash.
///
/// The map is guarded by a plain mutex that is never held across an await.
/// Each key owns a `OnceCell` that doubles as its in-progress marker: the
/// first caller on a miss runs the fetch, concurrent callers for the same key
/// wait on the cell, and callers for other keys are not blocked. A failed
/// fetch drops the empty cell from the map so the next caller retries and the
/// map only holds fetched or in-flight keys.
pub struct EntityStore<E: Entity> {
    client: Arc<dyn RpcClient>,
    entries: Mutex<HashMap<String, Slot<E>>>,
}

impl<E: Entity> EntityStore<E> {
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self {
            client,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Slot<E>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The entity if it is already cached; never fetches.
    pub fn cached(&self, key: &str) -> Option<Arc<E>> {
        self.entries()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of fetched entities
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn get(&self, key: &str) -> Result<Arc<E>, LookupError> {
        let slot = {
            let mut entries = self.entries();
            entries.entry(key.to_string()).or_default().clone()
        };
        let result = slot.get_or_try_init(|| self.fetch(key)).await.cloned();
        if result.is_err() {
            self.discard_empty(key, &slot);
        }
        result
    }

    fn discard_empty(&self, key: &str, slot: &Slot<E>) {
        let mut entries = self.entries();
        let stale = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            entries.remove(key);
        }
    }

    async fn fetch(&self, key: &str) -> Result<Arc<E>, LookupError> {
        tracing::debug!(kind = E::KIND, key, "cache miss, fetching");
        let value = self
            .client
            .request(E::METHOD, E::params(key))
            .await
            .map_err(|err| {
                if err.code() == Some(RPC_INVALID_ADDRESS_OR_KEY) || err.is_null_result() {
                    LookupError::NotFound(key.to_string())
                } else {
                    LookupError::Rpc(err)
                }
            })?;
        let entity: E = serde_json::from_value(value).map_err(|err| {
            LookupError::Rpc(RpcError::content(format!(
                "{} {key}: {err}",
                E::KIND
            )))
        })?;
        Ok(Arc::new(entity))
    }
}

/// Cache of transactions keyed by txid.
#[derive(Clone)]
pub struct TransactionStore {
    inner: Arc<EntityStore<Transaction>>,
}

impl TransactionStore {
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self {
            inner: Arc::new(EntityStore::new(client)),
        }
    }

    pub async fn get(&self, txid: &str) -> Result<Arc<Transaction>, LookupError> {
        self.inner.get(txid).await
    }

    pub fn cached(&self, txid: &str) -> Option<Arc<Transaction>> {
        self.inner.cached(txid)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
