use axum::Router;

pub mod orders;
pub mod pricing;
pub mod quotes;
pub mod system;

/// Router for the checkout surface.
pub fn router() -> Router {
    Router::new()
        .nest("/pricing", pricing::router())
        .nest("/quotes", quotes::router())
        .nest("/orders", orders::router())
}
