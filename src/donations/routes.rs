use super::handlers;
use axum::{routing::get, Router};

/// Creates the donations router
pub fn donations_routes() -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/donations",
            get(handlers::list_donations).post(handlers::create_donation),
        )
        .route(
            "/api/donations/:id",
            get(handlers::get_donation)
                .put(handlers::update_donation)
                .delete(handlers::delete_donation),
        )
}
