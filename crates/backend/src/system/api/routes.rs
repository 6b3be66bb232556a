use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::system::auth::middleware::{require_admin, require_auth};

/// Health check, authentication and user management routes
pub fn configure_system_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Public
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        // Any signed-in user
        .route(
            "/api/auth/me",
            get(handlers::auth::current_user)
                .put(handlers::auth::update_profile)
                .route_layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password).route_layer(middleware::from_fn(require_auth)),
        )
        // Admin only
        .route(
            "/api/users",
            get(handlers::users::list)
                .post(handlers::users::create)
                .route_layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/users/:id",
            get(handlers::users::get_by_id)
                .put(handlers::users::update)
                .delete(handlers::users::delete)
                .route_layer(middleware::from_fn(require_admin)),
        )
}
