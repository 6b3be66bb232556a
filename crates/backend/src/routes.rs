use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::system::api::routes::configure_system_routes;
use crate::system::auth::middleware::{require_admin, require_auth, require_seller};

/// All application routes.
///
/// Paths that mix public and protected methods register the protected
/// methods first, apply `route_layer`, then add the public ones.
pub fn configure_routes() -> Router {
    configure_system_routes()
        .merge(catalog_routes())
        .merge(customer_routes())
        .merge(seller_routes())
        .merge(admin_routes())
}

fn catalog_routes() -> Router {
    Router::new()
        // A001 Category
        .route(
            "/api/categories",
            post(handlers::a001_category::create)
                .route_layer(middleware::from_fn(require_admin))
                .get(handlers::a001_category::list),
        )
        .route(
            "/api/categories/:id",
            put(handlers::a001_category::update)
                .delete(handlers::a001_category::delete)
                .route_layer(middleware::from_fn(require_admin))
                .get(handlers::a001_category::get_by_id),
        )
        // A002 Store
        .route(
            "/api/stores",
            post(handlers::a002_store::create)
                .route_layer(middleware::from_fn(require_seller))
                .get(handlers::a002_store::list),
        )
        .route(
            "/api/stores/:id",
            put(handlers::a002_store::update)
                .delete(handlers::a002_store::delete)
                .route_layer(middleware::from_fn(require_seller))
                .get(handlers::a002_store::get_by_id),
        )
        // A003 Product
        .route(
            "/api/products",
            post(handlers::a003_product::create)
                .route_layer(middleware::from_fn(require_seller))
                .get(handlers::a003_product::list),
        )
        .route(
            "/api/products/:id",
            put(handlers::a003_product::update)
                .delete(handlers::a003_product::delete)
                .route_layer(middleware::from_fn(require_seller))
                .get(handlers::a003_product::get_by_id),
        )
        // A006 Review
        .route(
            "/api/products/:id/reviews",
            post(handlers::a006_review::create)
                .route_layer(middleware::from_fn(require_auth))
                .get(handlers::a006_review::list_for_product),
        )
        .route(
            "/api/reviews/:id",
            delete(handlers::a006_review::delete)
                .route_layer(middleware::from_fn(require_auth)),
        )
}

/// Routes of any signed-in user
fn customer_routes() -> Router {
    Router::new()
        // A004 Cart
        .route(
            "/api/cart",
            get(handlers::a004_cart::get).delete(handlers::a004_cart::clear),
        )
        .route(
            "/api/cart/items",
            post(handlers::a004_cart::add_item).put(handlers::a004_cart::update_item),
        )
        .route(
            "/api/cart/items/:product_id",
            delete(handlers::a004_cart::remove_item),
        )
        // A005 Order
        .route(
            "/api/orders",
            get(handlers::a005_order::list_own).post(handlers::a005_order::place),
        )
        .route("/api/orders/:id", get(handlers::a005_order::get_by_id))
        .route("/api/orders/:id/cancel", post(handlers::a005_order::cancel))
        // A007 Address
        .route(
            "/api/addresses",
            get(handlers::a007_address::list).post(handlers::a007_address::create),
        )
        .route(
            "/api/addresses/:id",
            put(handlers::a007_address::update).delete(handlers::a007_address::delete),
        )
        // A008 Wishlist
        .route("/api/wishlist", get(handlers::a008_wishlist::get))
        .route(
            "/api/wishlist/:product_id",
            post(handlers::a008_wishlist::add).delete(handlers::a008_wishlist::remove),
        )
        .route_layer(middleware::from_fn(require_auth))
}

fn seller_routes() -> Router {
    Router::new()
        .route("/api/seller/stores", get(handlers::a002_store::list_own))
        .route("/api/seller/products", get(handlers::a003_product::list_own))
        .route("/api/seller/orders", get(handlers::a005_order::list_for_seller))
        .route(
            "/api/orders/:id/status",
            put(handlers::a005_order::update_status),
        )
        .route_layer(middleware::from_fn(require_seller))
}

fn admin_routes() -> Router {
    Router::new()
        .route("/api/admin/orders", get(handlers::a005_order::list_all))
        .route(
            "/api/orders/:id/payment-status",
            put(handlers::a005_order::update_payment_status),
        )
        .route_layer(middleware::from_fn(require_admin))
}
