use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use order_store::infrastructure::order_repo::RedisOrderRepository;
use order_store::{build_server, create_pool, Config, OrderService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();

    let pool = create_pool(&config.redis_url()).await.map_err(|e| {
        log::error!("Failed to connect to redis at {}: {}", config.redis_addr, e);
        std::io::Error::other(e)
    })?;
    log::info!("Connected to redis at {}", config.redis_addr);

    let repo = RedisOrderRepository::new(pool, config.redis_timeout);
    let service = web::Data::new(OrderService::new(Arc::new(repo)));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(service, &config.host, config.port)?.await
}
