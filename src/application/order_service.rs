use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{LineItem, Order, OrderPage, PageRequest, StatusUpdate};
use crate::domain::ports::OrderRepository;

/// Orders returned per listing request.
pub const PAGE_SIZE: u64 = 50;

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    next_id: fn() -> u64,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self::with_id_generator(repo, rand::random::<u64>)
    }

    pub fn with_id_generator(repo: Arc<dyn OrderRepository>, next_id: fn() -> u64) -> Self {
        Self { repo, next_id }
    }

    /// Create an order under a fresh random id.
    ///
    /// An id collision surfaces as `DomainError::Conflict`; the caller may
    /// simply try again.
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        line_items: Vec<LineItem>,
    ) -> Result<Order, DomainError> {
        let order = Order::new((self.next_id)(), customer_id, line_items, Utc::now());
        self.repo.create(&order).await?;
        log::info!(
            "created order {} for customer {}",
            order.order_id,
            order.customer_id
        );
        Ok(order)
    }

    pub async fn get_order(&self, id: u64) -> Result<Order, DomainError> {
        self.repo.find_by_id(id).await
    }

    pub async fn list_orders(&self, cursor: u64) -> Result<OrderPage, DomainError> {
        self.repo
            .list_page(PageRequest {
                cursor,
                size: PAGE_SIZE,
            })
            .await
    }

    /// Read the order, apply the transition and write it back.
    ///
    /// The write only checks that the order still exists; a delete that lands
    /// between the read and the write is reported as `NotFound`.
    pub async fn update_status(
        &self,
        id: u64,
        status: StatusUpdate,
    ) -> Result<Order, DomainError> {
        let mut order = self.repo.find_by_id(id).await?;
        order.apply_status(status, Utc::now())?;
        self.repo.update_by_id(&order).await?;
        log::info!("order {} is now {}", id, order.state());
        Ok(order)
    }

    pub async fn delete_order(&self, id: u64) -> Result<(), DomainError> {
        self.repo.delete_by_id(id).await?;
        log::info!("deleted order {}", id);
        Ok(())
    }
}
