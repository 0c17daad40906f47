use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{LineItem, Order, StatusUpdate};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineItemDto {
    pub item_id: Uuid,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub price: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub line_items: Vec<LineItemDto>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// Either `"shipped"` or `"completed"`.
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: u64,
    pub customer_id: Uuid,
    pub line_items: Vec<LineItemDto>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<LineItemDto> for LineItem {
    fn from(dto: LineItemDto) -> Self {
        LineItem {
            item_id: dto.item_id,
            quantity: dto.quantity,
            price: dto.price,
        }
    }
}

impl From<LineItem> for LineItemDto {
    fn from(item: LineItem) -> Self {
        LineItemDto {
            item_id: item.item_id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            order_id: order.order_id,
            customer_id: order.customer_id,
            line_items: order.line_items.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            shipped_at: order.shipped_at,
            completed_at: order.completed_at,
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Opaque scan cursor returned as `next` by the previous page. Defaults to 0.
    #[serde(default)]
    pub cursor: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    /// Cursor for the following page; absent once the listing is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,
}

// ── Extractor configuration ──────────────────────────────────────────────────

/// Malformed bodies, ids and query strings are rejected before any handler runs.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order under a freshly generated id. The record and its entry in
/// the order index are written atomically.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Malformed request body"),
        (status = 409, description = "Generated id collided with an existing order"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let line_items = body.line_items.into_iter().map(Into::into).collect();

    let order = service.create_order(body.customer_id, line_items).await?;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns one page of orders. Pass the returned `next` back as `cursor` to
/// continue; pages may be short and an order may show up more than once while
/// the index changes underneath the scan.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("cursor" = Option<u64>, Query, description = "Scan cursor (default 0)"),
    ),
    responses(
        (status = 200, description = "One page of orders", body = ListOrdersResponse),
        (status = 400, description = "Malformed cursor"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<OrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let page = service.list_orders(query.cursor).await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: page.orders.into_iter().map(Into::into).collect(),
        next: (page.cursor != 0).then_some(page.cursor),
    }))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = u64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}
///
/// Moves the order to `shipped` or `completed`. Timestamps are set once and
/// never rewritten, so repeating a transition or completing an unshipped
/// order is a bad request.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = u64, Path, description = "Order id"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Unknown status or illegal transition"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<OrderService>,
    path: web::Path<u64>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let status: StatusUpdate = body.status.parse()?;
    let order = service.update_status(path.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = u64, Path, description = "Order id"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<OrderService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    service.delete_order(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
