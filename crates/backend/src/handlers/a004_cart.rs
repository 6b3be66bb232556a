use axum::extract::{Json, Path, Query};
use contracts::domain::a004_cart::aggregate::{Cart, CartItemDto, CartLineQuery};

use crate::domain::a004_cart::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/cart
pub async fn get(user: CurrentUser) -> ApiResult<Json<Cart>> {
    Ok(Json(service::get_or_new(user.id()).await?))
}

/// POST /api/cart/items
pub async fn add_item(user: CurrentUser, Json(dto): Json<CartItemDto>) -> ApiResult<Json<Cart>> {
    Ok(Json(service::add_item(user.id(), dto).await?))
}

/// PUT /api/cart/items, quantity 0 removes the line
pub async fn update_item(user: CurrentUser, Json(dto): Json<CartItemDto>) -> ApiResult<Json<Cart>> {
    Ok(Json(service::update_item(user.id(), dto).await?))
}

/// DELETE /api/cart/items/:product_id?variantId=
pub async fn remove_item(
    user: CurrentUser,
    Path(product_id): Path<String>,
    Query(line): Query<CartLineQuery>,
) -> ApiResult<Json<Cart>> {
    let product_id = parse_id(&product_id)?;
    Ok(Json(
        service::remove_item(user.id(), product_id, line.variant_id.as_deref()).await?,
    ))
}

/// DELETE /api/cart
pub async fn clear(user: CurrentUser) -> ApiResult<Json<Cart>> {
    Ok(Json(service::clear(user.id()).await?))
}
