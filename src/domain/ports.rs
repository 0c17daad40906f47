use async_trait::async_trait;

use super::errors::DomainError;
use super::order::{Order, OrderPage, PageRequest};

/// Storage for orders plus the global index of known order keys.
///
/// Implementations keep a record and its index entry in lockstep: `create`
/// and `delete_by_id` either change both or neither.
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Insert a new order. Fails with `Conflict` if the id is taken.
    async fn create(&self, order: &Order) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: u64) -> Result<Order, DomainError>;
    /// Replace an existing order. Fails with `NotFound` if it is gone.
    async fn update_by_id(&self, order: &Order) -> Result<(), DomainError>;
    async fn delete_by_id(&self, id: u64) -> Result<(), DomainError>;
    async fn list_page(&self, page: PageRequest) -> Result<OrderPage, DomainError>;
}
