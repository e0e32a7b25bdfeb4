use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::key::CacheKey;

/// Slot de uma entrada. Vazio enquanto a leitura está em andamento;
/// chamadas concorrentes para a mesma chave compartilham o mesmo slot.
pub(crate) type Slot<V> = Arc<OnceCell<V>>;

/// Mapa chave→valor limitado, com descarte do menos usado recentemente.
///
/// A capacidade é aplicada manualmente sobre um [`LruCache`] sem limite e
/// conta apenas entradas resolvidas. Slots ainda em preenchimento não ocupam
/// capacidade nem são descartados; o limite é reaplicado quando se resolvem.
pub struct CacheStore<V> {
    entries: Mutex<LruCache<CacheKey, Slot<V>>>,
    capacity: NonZeroUsize,
}

impl<V: Clone> CacheStore<V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            capacity,
        }
    }

    /// Indica se há valor resolvido para a chave. Não altera a recência.
    pub fn has(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .peek(key)
            .map_or(false, |slot| slot.initialized())
    }

    /// Valor resolvido para a chave; marca a entrada como usada.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Grava um valor. Regravar uma chave já resolvida não altera o tamanho
    /// nem descarta outras entradas.
    pub fn set(&self, key: CacheKey, value: V) {
        let slot = Arc::new(OnceCell::new_with(Some(value)));
        let mut entries = self.entries.lock();
        match entries.get_mut(&key) {
            Some(existing) => *existing = slot,
            None => {
                entries.put(key.clone(), slot);
            }
        }
        Self::enforce_bound(&mut entries, self.capacity, &key);
    }

    /// Quantidade de entradas resolvidas
    pub fn len(&self) -> usize {
        Self::settled(&self.entries.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Slot da chave, criado vazio se ainda não existir
    pub(crate) fn slot(&self, key: &CacheKey) -> Slot<V> {
        let mut entries = self.entries.lock();
        if let Some(slot) = entries.get(key) {
            return slot.clone();
        }
        let slot: Slot<V> = Arc::new(OnceCell::new());
        entries.put(key.clone(), slot.clone());
        slot
    }

    /// Chamado após uma leitura bem-sucedida em `slot`
    pub(crate) fn settle(&self, key: &CacheKey, slot: &Slot<V>) {
        let mut entries = self.entries.lock();
        if !entries.contains(key) {
            // o slot foi removido por uma falha concorrente
            entries.put(key.clone(), slot.clone());
        }
        Self::enforce_bound(&mut entries, self.capacity, key);
    }

    /// Remove o slot após uma leitura com falha, se ele ainda estiver vazio
    pub(crate) fn discard(&self, key: &CacheKey, slot: &Slot<V>) {
        let mut entries = self.entries.lock();
        let same_pending = entries
            .peek(key)
            .map_or(false, |current| Arc::ptr_eq(current, slot) && !current.initialized());
        if same_pending {
            entries.pop(key);
        }
    }

    fn settled(entries: &LruCache<CacheKey, Slot<V>>) -> usize {
        entries.iter().filter(|(_, slot)| slot.initialized()).count()
    }

    fn enforce_bound(entries: &mut LruCache<CacheKey, Slot<V>>, capacity: NonZeroUsize, protected: &CacheKey) {
        let mut settled = Self::settled(entries);
        while settled > capacity.get() {
            let victim = entries
                .iter()
                .rev()
                .find(|(key, slot)| *key != protected && slot.initialized())
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    trace!(key = %key, "entrada descartada do cache");
                    entries.pop(&key);
                    settled -= 1;
                }
                None => break,
            }
        }
    }
}
