//! End-to-end test: HTTP API → order service → Redis.
//!
//! Starts a throwaway Redis container through testcontainers, so Docker must be
//! available. Run with:
//!
//!   cargo test --test e2e_test -- --include-ignored

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use order_store::infrastructure::order_repo::RedisOrderRepository;
use order_store::{build_server, create_pool, OrderService};
use redis::AsyncCommands;
use reqwest::Client;
use serde_json::{json, Value};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{GenericImage, ImageExt};
use uuid::Uuid;

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind failed")
        .local_addr()
        .expect("addr failed")
        .port()
}

/// Wait until `url` answers at all, retrying every `interval` for up to
/// `timeout` total. Panics if the service never comes up.
async fn wait_for_http(label: &str, url: &str, timeout: Duration, interval: Duration) {
    let client = Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .unwrap();
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::time::Instant::now() > deadline {
            panic!("{} did not become ready within {:?}", label, timeout);
        }
        // Any HTTP response (even 4xx) means the server is up.
        if client.get(url).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Full lifecycle against a real Redis:
///  1. Create an order and check both the record and its index entry.
///  2. Ship, then complete it; a second completion is rejected.
///  3. List it through the cursor API.
///  4. Delete it and check both keys are gone.
#[actix_web::test]
#[ignore = "requires Docker"]
async fn test_order_lifecycle_against_redis() {
    // ── Infrastructure ───────────────────────────────────────────────────────
    let redis_port = free_port();
    let _container = GenericImage::new("redis", "7-alpine")
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
        .with_mapped_port(redis_port, ContainerPort::Tcp(6379))
        .start()
        .await
        .expect("Failed to start Redis container");

    let pool = create_pool(&format!("redis://127.0.0.1:{}", redis_port))
        .await
        .expect("Failed to connect to Redis");
    let repo = RedisOrderRepository::new(pool.clone(), Duration::from_secs(5));
    let service = web::Data::new(OrderService::new(Arc::new(repo)));

    let app_port = free_port();
    let server =
        build_server(service, "127.0.0.1", app_port).expect("Failed to bind the order service");
    actix_web::rt::spawn(server);

    let app_url = format!("http://127.0.0.1:{}", app_port);
    wait_for_http(
        "order service",
        &format!("{}/orders", app_url),
        Duration::from_secs(10),
        Duration::from_millis(300),
    )
    .await;

    let http = Client::new();
    let mut redis_conn = pool.clone();

    // ── 1. Create ────────────────────────────────────────────────────────────
    let customer_id = Uuid::new_v4();
    let resp = http
        .post(format!("{}/orders", app_url))
        .json(&json!({
            "customer_id": customer_id,
            "line_items": [
                { "item_id": Uuid::new_v4(), "quantity": 2, "price": 1999 },
                { "item_id": Uuid::new_v4(), "quantity": 1, "price": 450 }
            ]
        }))
        .send()
        .await
        .expect("Failed to POST /orders");
    assert_eq!(resp.status(), 201, "Expected 201 Created from POST /orders");

    let created: Value = resp.json().await.expect("invalid create body");
    let order_id = created["order_id"]
        .as_u64()
        .expect("Response body missing 'order_id'");
    let key = format!("order:{}", order_id);

    let stored: Option<String> = redis_conn.get(&key).await.expect("GET failed");
    assert!(stored.is_some(), "order record missing from Redis");
    let indexed: bool = redis_conn
        .sismember("orders", &key)
        .await
        .expect("SISMEMBER failed");
    assert!(indexed, "order key missing from the index set");

    // ── 2. Ship and complete ─────────────────────────────────────────────────
    let order_url = format!("{}/orders/{}", app_url, order_id);
    for (status, expected) in [("shipped", 200), ("completed", 200), ("completed", 400)] {
        let resp = http
            .put(&order_url)
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("Failed to PUT order");
        assert_eq!(resp.status(), expected, "PUT status={}", status);
    }

    let fetched: Value = http
        .get(&order_url)
        .send()
        .await
        .expect("Failed to GET order")
        .json()
        .await
        .expect("invalid order body");
    assert!(fetched["shipped_at"].is_string());
    assert!(fetched["completed_at"].is_string());
    assert_eq!(fetched["created_at"], created["created_at"]);

    // ── 3. List ──────────────────────────────────────────────────────────────
    let page: Value = http
        .get(format!("{}/orders?cursor=0", app_url))
        .send()
        .await
        .expect("Failed to GET /orders")
        .json()
        .await
        .expect("invalid list body");
    let items = page["items"].as_array().expect("items should be an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["order_id"].as_u64(), Some(order_id));

    // ── 4. Delete ────────────────────────────────────────────────────────────
    let resp = http
        .delete(&order_url)
        .send()
        .await
        .expect("Failed to DELETE order");
    assert_eq!(resp.status(), 204);

    let exists: bool = redis_conn.exists(&key).await.expect("EXISTS failed");
    assert!(!exists, "order record survived delete");
    let members: usize = redis_conn.scard("orders").await.expect("SCARD failed");
    assert_eq!(members, 0, "index entry survived delete");

    let resp = http
        .get(&order_url)
        .send()
        .await
        .expect("Failed to GET order");
    assert_eq!(resp.status(), 404);
}
