use axum::extract::{Json, Path};
use contracts::domain::a008_wishlist::aggregate::WishlistView;

use crate::domain::a008_wishlist::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/wishlist
pub async fn get(user: CurrentUser) -> ApiResult<Json<WishlistView>> {
    Ok(Json(service::get(user.id()).await?))
}

/// POST /api/wishlist/:product_id
pub async fn add(user: CurrentUser, Path(product_id): Path<String>) -> ApiResult<Json<WishlistView>> {
    Ok(Json(service::add(user.id(), parse_id(&product_id)?).await?))
}

/// DELETE /api/wishlist/:product_id
pub async fn remove(user: CurrentUser, Path(product_id): Path<String>) -> ApiResult<Json<WishlistView>> {
    Ok(Json(service::remove(user.id(), parse_id(&product_id)?).await?))
}
