use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: Uuid,
    pub quantity: u32,
    pub price: u64,
}

/// The persisted order record.
///
/// `shipped_at` and `completed_at` only ever move from unset to set, in that
/// order; see [`Order::apply_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub customer_id: Uuid,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Created,
    Shipped,
    Completed,
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderState::Created => "created",
            OrderState::Shipped => "shipped",
            OrderState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A requested status change, as sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Shipped,
    Completed,
}

impl FromStr for StatusUpdate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipped" => Ok(StatusUpdate::Shipped),
            "completed" => Ok(StatusUpdate::Completed),
            other => Err(DomainError::InvalidInput(format!(
                "unknown status '{}'",
                other
            ))),
        }
    }
}

impl Order {
    pub fn new(
        order_id: u64,
        customer_id: Uuid,
        line_items: Vec<LineItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            line_items,
            created_at,
            shipped_at: None,
            completed_at: None,
        }
    }

    pub fn state(&self) -> OrderState {
        match (self.shipped_at, self.completed_at) {
            (_, Some(_)) => OrderState::Completed,
            (Some(_), None) => OrderState::Shipped,
            (None, None) => OrderState::Created,
        }
    }

    /// Apply a status change stamped with `at`.
    ///
    /// Shipping requires an unshipped order. Completing requires a shipped,
    /// not yet completed order. A rejected change leaves the order untouched.
    pub fn apply_status(
        &mut self,
        update: StatusUpdate,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        match update {
            StatusUpdate::Shipped => {
                if self.shipped_at.is_some() {
                    return Err(DomainError::InvalidInput(
                        "order has already been shipped".to_string(),
                    ));
                }
                self.shipped_at = Some(at);
            }
            StatusUpdate::Completed => {
                if self.completed_at.is_some() {
                    return Err(DomainError::InvalidInput(
                        "order has already been completed".to_string(),
                    ));
                }
                if self.shipped_at.is_none() {
                    return Err(DomainError::InvalidInput(
                        "order must be shipped before it can be completed".to_string(),
                    ));
                }
                self.completed_at = Some(at);
            }
        }
        Ok(())
    }
}

/// Cursor-based page request over the order index.
///
/// `cursor` is opaque: start with 0 and feed back whatever the previous page
/// returned. `size` is a hint, pages may be shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    /// Cursor for the next page, 0 once the scan has wrapped around.
    pub cursor: u64,
}

impl OrderPage {
    pub fn empty() -> Self {
        Self {
            orders: Vec::new(),
            cursor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_order() -> Order {
        Order::new(
            42,
            Uuid::new_v4(),
            vec![LineItem {
                item_id: Uuid::new_v4(),
                quantity: 2,
                price: 1_000,
            }],
            Utc::now(),
        )
    }

    #[test]
    fn new_order_is_created() {
        let order = new_order();
        assert_eq!(order.state(), OrderState::Created);
        assert!(order.shipped_at.is_none());
        assert!(order.completed_at.is_none());
    }

    #[test]
    fn ship_then_complete() {
        let mut order = new_order();
        let shipped = order.created_at + Duration::seconds(1);
        let completed = shipped + Duration::seconds(1);

        order.apply_status(StatusUpdate::Shipped, shipped).unwrap();
        assert_eq!(order.state(), OrderState::Shipped);
        assert_eq!(order.shipped_at, Some(shipped));

        order.apply_status(StatusUpdate::Completed, completed).unwrap();
        assert_eq!(order.state(), OrderState::Completed);
        assert_eq!(order.shipped_at, Some(shipped));
        assert_eq!(order.completed_at, Some(completed));
    }

    #[test]
    fn shipping_twice_is_rejected_and_keeps_timestamp() {
        let mut order = new_order();
        let first = Utc::now();
        order.apply_status(StatusUpdate::Shipped, first).unwrap();

        let err = order
            .apply_status(StatusUpdate::Shipped, first + Duration::minutes(5))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(order.shipped_at, Some(first));
    }

    #[test]
    fn completing_unshipped_order_is_rejected() {
        let mut order = new_order();
        let err = order
            .apply_status(StatusUpdate::Completed, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(order.completed_at.is_none());
        assert_eq!(order.state(), OrderState::Created);
    }

    #[test]
    fn completed_order_accepts_no_further_updates() {
        let mut order = new_order();
        order.apply_status(StatusUpdate::Shipped, Utc::now()).unwrap();
        order.apply_status(StatusUpdate::Completed, Utc::now()).unwrap();
        let snapshot = order.clone();

        assert!(order.apply_status(StatusUpdate::Shipped, Utc::now()).is_err());
        assert!(order.apply_status(StatusUpdate::Completed, Utc::now()).is_err());
        assert_eq!(order, snapshot);
    }

    #[test]
    fn parses_known_statuses_only() {
        assert_eq!("shipped".parse::<StatusUpdate>().unwrap(), StatusUpdate::Shipped);
        assert_eq!(
            "completed".parse::<StatusUpdate>().unwrap(),
            StatusUpdate::Completed
        );
        for bad in ["", "SHIPPED", "cancelled", "created"] {
            assert!(matches!(
                bad.parse::<StatusUpdate>(),
                Err(DomainError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn unset_timestamps_are_omitted_from_json() {
        let order = new_order();
        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("shipped_at").is_none());
        assert!(value.get("completed_at").is_none());
        assert_eq!(value["order_id"], 42);

        let decoded: Order = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, order);
    }
}
