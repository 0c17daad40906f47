pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_service::OrderService;
pub use config::Config;
pub use db::{create_pool, RedisPool};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
    ),
    tags((name = "orders", description = "Order storage"))
)]
pub struct ApiDoc;

/// Register the `/orders` resource and its extractor configuration.
///
/// Expects a `web::Data<OrderService>` to be registered on the app.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .configure(handlers::orders::configure_extractors)
            .route("", web::post().to(handlers::orders::create_order))
            .route("", web::get().to(handlers::orders::list_orders))
            .route("/{id}", web::get().to(handlers::orders::get_order))
            .route("/{id}", web::put().to(handlers::orders::update_order))
            .route("/{id}", web::delete().to(handlers::orders::delete_order)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. SIGINT/SIGTERM trigger a graceful shutdown that waits up to
/// ten seconds for in-flight requests.
pub fn build_server(
    service: web::Data<OrderService>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .shutdown_timeout(10)
    .bind((host.to_string(), port))?
    .run())
}
