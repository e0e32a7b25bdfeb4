use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;
use vigia_core::error::Result;
use vigia_core::types::BlockTag;

use crate::config::CacheConfig;
use crate::key::CacheKey;
use crate::store::{CacheStore, Slot};

/// Contadores de uso de um [`BlockFetcher`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetcherStats {
    pub hits: u64,
    pub misses: u64,
    pub bypassed: u64,
}

/// Fachada read-through sobre um [`CacheStore`].
///
/// Para um bloco histórico fixo e os mesmos argumentos, a leitura remota
/// acontece no máximo uma vez enquanto a entrada não for descartada.
/// Chamadas concorrentes para uma chave ainda não resolvida aguardam a mesma
/// leitura. Falhas nunca são memorizadas.
pub struct BlockFetcher<V> {
    name: String,
    store: CacheStore<V>,
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

impl<V: Clone + Send + Sync> BlockFetcher<V> {
    pub fn new(name: impl Into<String>, capacity: NonZeroUsize) -> Self {
        Self {
            name: name.into(),
            store: CacheStore::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
        }
    }

    pub fn from_config(name: impl Into<String>, config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(name, config.capacity()?))
    }

    /// Busca o valor de `key`, executando `read` apenas em caso de miss.
    ///
    /// Leituras em `latest`/`pending` não passam pelo store.
    pub async fn fetch<F, Fut>(&self, key: CacheKey, block: BlockTag, read: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if !block.is_historical() {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
            debug!(fetcher = %self.name, key = %key, block = %block, "leitura fora do cache");
            return read().await;
        }

        let slot = self.store.slot(&key);
        if let Some(value) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(fetcher = %self.name, key = %key, "cache hit");
            return Ok(value.clone());
        }

        let mut executed = false;
        let value = slot
            .get_or_try_init(|| {
                executed = true;
                // só quem executa a leitura remove o slot vazio, se ela falhar
                // ou se este future for descartado
                let pending = PendingSlot {
                    store: &self.store,
                    key: &key,
                    slot: &slot,
                    armed: true,
                };
                async move {
                    let result = read().await;
                    if result.is_ok() {
                        pending.disarm();
                    }
                    result
                }
            })
            .await?
            .clone();

        if executed {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(fetcher = %self.name, key = %key, "cache miss");
            self.store.settle(&key, &slot);
        } else {
            // outra chamada resolveu a mesma chave enquanto esperávamos
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(fetcher = %self.name, key = %key, "cache hit (leitura compartilhada)");
        }
        Ok(value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &CacheStore<V> {
        &self.store
    }

    pub fn stats(&self) -> FetcherStats {
        FetcherStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }
}

struct PendingSlot<'a, V: Clone> {
    store: &'a CacheStore<V>,
    key: &'a CacheKey,
    slot: &'a Slot<V>,
    armed: bool,
}

impl<V: Clone> PendingSlot<'_, V> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<V: Clone> Drop for PendingSlot<'_, V> {
    fn drop(&mut self) {
        if self.armed && !self.slot.initialized() {
            self.store.discard(self.key, self.slot);
        }
    }
}
