use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{RedisResult, Script};

use crate::db::RedisPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderPage, PageRequest};
use crate::domain::ports::OrderRepository;

use super::{decode_order, encode_order, order_key, ORDER_INDEX_KEY};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<redis::RedisError> for DomainError {
    fn from(e: redis::RedisError) -> Self {
        DomainError::StorageUnavailable(e.to_string())
    }
}

// ── Server-side scripts ──────────────────────────────────────────────────────
//
// Each script runs atomically on the server: the record and its index entry
// change together or not at all. SADD/SREM only run when SET NX/DEL succeeded.

/// KEYS[1] = order key, KEYS[2] = index set, ARGV[1] = encoded order.
/// Returns 1 when inserted, 0 when the key already existed.
const CREATE_SCRIPT: &str = r#"
if redis.call('SET', KEYS[1], ARGV[1], 'NX') then
    redis.call('SADD', KEYS[2], KEYS[1])
    return 1
end
return 0
"#;

/// KEYS[1] = order key, KEYS[2] = index set.
/// Returns 1 when removed, 0 when there was no such order.
const DELETE_SCRIPT: &str = r#"
if redis.call('DEL', KEYS[1]) == 1 then
    redis.call('SREM', KEYS[2], KEYS[1])
    return 1
end
return 0
"#;

// ── Repository ────────────────────────────────────────────────────────────────

pub struct RedisOrderRepository {
    conn: RedisPool,
    timeout: Duration,
    create_script: Script,
    delete_script: Script,
}

impl RedisOrderRepository {
    pub fn new(conn: RedisPool, timeout: Duration) -> Self {
        Self {
            conn,
            timeout,
            create_script: Script::new(CREATE_SCRIPT),
            delete_script: Script::new(DELETE_SCRIPT),
        }
    }

    /// Run one backend round trip under the configured deadline.
    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                log::error!("redis {} failed: {}", op, e);
                Err(e.into())
            }
            Err(_) => {
                log::error!("redis {} timed out after {:?}", op, self.timeout);
                Err(DomainError::StorageUnavailable(format!(
                    "{} timed out after {:?}",
                    op, self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl OrderRepository for RedisOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let data = encode_order(order)?;
        let key = order_key(order.order_id);
        let mut conn = self.conn.clone();

        let inserted: i64 = self
            .call(
                "create",
                self.create_script
                    .key(&key)
                    .key(ORDER_INDEX_KEY)
                    .arg(data)
                    .invoke_async(&mut conn),
            )
            .await?;

        if inserted == 0 {
            log::debug!("order key {} already taken", key);
            return Err(DomainError::Conflict);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: u64) -> Result<Order, DomainError> {
        let key = order_key(id);
        let mut conn = self.conn.clone();

        let raw: Option<String> = self
            .call("get", redis::cmd("GET").arg(&key).query_async(&mut conn))
            .await?;

        match raw {
            Some(raw) => decode_order(&key, &raw),
            None => Err(DomainError::NotFound),
        }
    }

    async fn update_by_id(&self, order: &Order) -> Result<(), DomainError> {
        let data = encode_order(order)?;
        let key = order_key(order.order_id);
        let mut conn = self.conn.clone();

        // SET .. XX replies nil when the key is missing.
        let reply: redis::Value = self
            .call(
                "update",
                redis::cmd("SET")
                    .arg(&key)
                    .arg(data)
                    .arg("XX")
                    .query_async(&mut conn),
            )
            .await?;

        match reply {
            redis::Value::Nil => Err(DomainError::NotFound),
            _ => Ok(()),
        }
    }

    async fn delete_by_id(&self, id: u64) -> Result<(), DomainError> {
        let key = order_key(id);
        let mut conn = self.conn.clone();

        let removed: i64 = self
            .call(
                "delete",
                self.delete_script
                    .key(&key)
                    .key(ORDER_INDEX_KEY)
                    .invoke_async(&mut conn),
            )
            .await?;

        if removed == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn list_page(&self, page: PageRequest) -> Result<OrderPage, DomainError> {
        let mut conn = self.conn.clone();

        let (cursor, keys): (u64, Vec<String>) = self
            .call(
                "sscan",
                redis::cmd("SSCAN")
                    .arg(ORDER_INDEX_KEY)
                    .arg(page.cursor)
                    .arg("COUNT")
                    .arg(page.size.max(1))
                    .query_async(&mut conn),
            )
            .await?;

        if keys.is_empty() {
            return Ok(OrderPage {
                orders: Vec::new(),
                cursor,
            });
        }

        let values: Vec<Option<String>> = self
            .call("mget", redis::cmd("MGET").arg(&keys).query_async(&mut conn))
            .await?;

        let mut orders = Vec::with_capacity(values.len());
        for (key, value) in keys.iter().zip(values) {
            match value {
                Some(raw) => orders.push(decode_order(key, &raw)?),
                // Deleted between the scan and the fetch.
                None => log::debug!("index member {} vanished before fetch", key),
            }
        }

        Ok(OrderPage { orders, cursor })
    }
}
