//! Block cache with chain linkage and height-offset navigation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::entity::EntityStore;
use crate::core::{LookupError, RpcError};
use crate::domain::Block;
use crate::infrastructure::rpc::RpcClient;

/// Node error code for "block height out of range"
const RPC_INVALID_PARAMETER: i64 = -8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards genesis
    Back,
    /// Towards the tip
    Forward,
}

#[derive(Debug, Default)]
struct ChainState {
    /// Successor links observed after a block was fetched
    next_links: HashMap<String, String>,
    best: Option<(String, u64)>,
}

struct Inner {
    blocks: EntityStore<Block>,
    client: Arc<dyn RpcClient>,
    chain: Mutex<ChainState>,
}

/// Shared handle to the block cache.
///
/// Cached blocks are immutable. The only thing learned after the fact is a
/// block's successor, which is recorded once in the link table; a different
/// successor for the same block later means the chain reorganized.
#[derive(Clone)]
pub struct BlockStore {
    inner: Arc<Inner>,
}

impl BlockStore {
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self {
            inner: Arc::new(Inner {
                blocks: EntityStore::new(Arc::clone(&client)),
                client,
                chain: Mutex::new(ChainState::default()),
            }),
        }
    }

    fn chain(&self) -> MutexGuard<'_, ChainState> {
        self.inner
            .chain
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn get(&self, hash: &str) -> Result<Arc<Block>, LookupError> {
        self.inner.blocks.get(hash).await
    }

    pub fn cached(&self, hash: &str) -> Option<Arc<Block>> {
        self.inner.blocks.cached(hash)
    }

    pub fn len(&self) -> usize {
        self.inner.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.blocks.is_empty()
    }

    /// Current chain tip as `(hash, height)`
    pub fn best(&self) -> Option<(String, u64)> {
        self.chain().best.clone()
    }

    /// Successor of a cached block as far as it is known, without fetching.
    pub fn known_next(&self, hash: &str) -> Option<String> {
        let linked = self.chain().next_links.get(hash).cloned();
        linked.or_else(|| self.cached(hash).and_then(|b| b.next_hash.clone()))
    }

    pub async fn previous_of(&self, hash: &str) -> Result<String, LookupError> {
        let block = self.get(hash).await?;
        block.previous_hash.clone().ok_or(LookupError::NotLinked)
    }

    pub async fn next_of(&self, hash: &str) -> Result<String, LookupError> {
        let block = self.get(hash).await?;
        let chain = self.chain();
        chain
            .next_links
            .get(hash)
            .cloned()
            .or_else(|| block.next_hash.clone())
            .ok_or(LookupError::NotLinked)
    }

    /// Hash of the block `n` heights away from `hash`.
    pub async fn by_offset_from_height(
        &self,
        hash: &str,
        n: u64,
        direction: Direction,
    ) -> Result<String, LookupError> {
        if n == 0 {
            return Err(LookupError::OutOfRange);
        }

        let block = self.get(hash).await?;
        let target = match direction {
            Direction::Back => block.height.checked_sub(n).ok_or(LookupError::OutOfRange)?,
            Direction::Forward => {
                let (_, best_height) = self.best().ok_or(LookupError::OutOfRange)?;
                let target = block.height.checked_add(n).ok_or(LookupError::OutOfRange)?;
                if target > best_height {
                    return Err(LookupError::OutOfRange);
                }
                target
            }
        };

        let value = self
            .inner
            .client
            .request("getblockhash", vec![Value::from(target)])
            .await
            .map_err(|err| match err.code() {
                Some(RPC_INVALID_PARAMETER) => LookupError::OutOfRange,
                _ => LookupError::Rpc(err),
            })?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LookupError::Rpc(RpcError::content("getblockhash: result is not a string")))
    }

    /// Record the chain tip reported by the node.
    ///
    /// Fetches the tip if needed, then stitches it in as the successor of its
    /// cached predecessor. Repeating the same tip is a no-op; a predecessor
    /// that already has a different successor yields
    /// [`LookupError::ReorgDetected`].
    pub async fn record_best(&self, hash: &str) -> Result<Arc<Block>, LookupError> {
        let block = self.get(hash).await?;

        let mut chain = self.chain();
        if let Some(prev_hash) = &block.previous_hash {
            if let Some(prev) = self.inner.blocks.cached(prev_hash) {
                let recorded = chain
                    .next_links
                    .get(prev_hash)
                    .cloned()
                    .or_else(|| prev.next_hash.clone());
                match recorded {
                    Some(recorded) if recorded != block.hash => {
                        tracing::error!(
                            block = %prev_hash,
                            %recorded,
                            observed = %block.hash,
                            "successor changed, chain reorganized"
                        );
                        return Err(LookupError::ReorgDetected {
                            block: prev_hash.clone(),
                            recorded,
                            observed: block.hash.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        tracing::debug!(block = %prev_hash, next = %block.hash, "linked successor");
                        chain
                            .next_links
                            .insert(prev_hash.clone(), block.hash.clone());
                    }
                }
            }
        }

        chain.best = Some((block.hash.clone(), block.height));
        Ok(block)
    }
}
