pub mod in_memory;
pub mod order_repo;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;

/// Set holding the key of every stored order.
pub const ORDER_INDEX_KEY: &str = "orders";

pub fn order_key(id: u64) -> String {
    format!("order:{}", id)
}

// ── Record encoding (shared by every backend) ────────────────────────────────

pub(crate) fn encode_order(order: &Order) -> Result<String, DomainError> {
    serde_json::to_string(order).map_err(|e| {
        log::error!("failed to encode order {}: {}", order.order_id, e);
        DomainError::Internal(format!("encode order: {}", e))
    })
}

pub(crate) fn decode_order(key: &str, raw: &str) -> Result<Order, DomainError> {
    serde_json::from_str(raw).map_err(|e| {
        log::error!("failed to decode record at {}: {}", key, e);
        DomainError::Decode(format!("{}: {}", key, e))
    })
}
