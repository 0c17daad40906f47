use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderPage, PageRequest};
use crate::domain::ports::OrderRepository;

use super::{decode_order, encode_order, order_key};

#[derive(Default)]
struct Keyspace {
    records: HashMap<String, String>,
    index: BTreeSet<String>,
}

/// A process-local stand-in for the Redis keyspace.
///
/// Records are kept encoded, exactly as Redis would hold them, and every
/// record/index mutation happens under one write lock. The index is scanned in
/// key order; the cursor is the number of members already returned.
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    keyspace: Arc<RwLock<Keyspace>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bulk record fetches issued by `list_page`.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Store raw bytes under an order key and index it, bypassing encoding.
    pub async fn insert_raw(&self, id: u64, raw: &str) {
        let key = order_key(id);
        let mut keyspace = self.keyspace.write().await;
        keyspace.records.insert(key.clone(), raw.to_string());
        keyspace.index.insert(key);
    }

    pub async fn is_indexed(&self, id: u64) -> bool {
        self.keyspace.read().await.index.contains(&order_key(id))
    }

    pub async fn index_len(&self) -> usize {
        self.keyspace.read().await.index.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let data = encode_order(order)?;
        let key = order_key(order.order_id);

        let mut keyspace = self.keyspace.write().await;
        if keyspace.records.contains_key(&key) {
            return Err(DomainError::Conflict);
        }
        keyspace.records.insert(key.clone(), data);
        keyspace.index.insert(key);
        Ok(())
    }

    async fn find_by_id(&self, id: u64) -> Result<Order, DomainError> {
        let key = order_key(id);
        let keyspace = self.keyspace.read().await;
        match keyspace.records.get(&key) {
            Some(raw) => decode_order(&key, raw),
            None => Err(DomainError::NotFound),
        }
    }

    async fn update_by_id(&self, order: &Order) -> Result<(), DomainError> {
        let data = encode_order(order)?;
        let key = order_key(order.order_id);

        let mut keyspace = self.keyspace.write().await;
        match keyspace.records.get_mut(&key) {
            Some(slot) => {
                *slot = data;
                Ok(())
            }
            None => Err(DomainError::NotFound),
        }
    }

    async fn delete_by_id(&self, id: u64) -> Result<(), DomainError> {
        let key = order_key(id);

        let mut keyspace = self.keyspace.write().await;
        if keyspace.records.remove(&key).is_none() {
            return Err(DomainError::NotFound);
        }
        keyspace.index.remove(&key);
        Ok(())
    }

    async fn list_page(&self, page: PageRequest) -> Result<OrderPage, DomainError> {
        let keyspace = self.keyspace.read().await;

        let start = usize::try_from(page.cursor).unwrap_or(usize::MAX);
        let size = usize::try_from(page.size.max(1)).unwrap_or(usize::MAX);
        let keys: Vec<&String> = keyspace.index.iter().skip(start).take(size).collect();

        if keys.is_empty() {
            return Ok(OrderPage::empty());
        }

        let end = start + keys.len();
        let cursor = if end >= keyspace.index.len() {
            0
        } else {
            end as u64
        };

        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut orders = Vec::with_capacity(keys.len());
        for key in keys {
            // Members and records change under the same lock, so every member resolves.
            let raw = keyspace.records.get(key).ok_or_else(|| {
                DomainError::Internal(format!("index member {} has no record", key))
            })?;
            orders.push(decode_order(key, raw)?);
        }

        Ok(OrderPage { orders, cursor })
    }
}
