use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::domain::a002_store::aggregate::{Store, StoreDto};

use crate::domain::a002_store::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/stores
pub async fn list() -> ApiResult<Json<Vec<Store>>> {
    Ok(Json(service::list_active().await?))
}

/// GET /api/stores/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Store>> {
    Ok(Json(service::get_public(parse_id(&id)?).await?))
}

/// POST /api/stores, the caller becomes the owner
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<StoreDto>,
) -> ApiResult<(StatusCode, Json<Store>)> {
    let store = service::create(&claims, dto).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// PUT /api/stores/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<StoreDto>,
) -> ApiResult<Json<Store>> {
    Ok(Json(service::update(&claims, parse_id(&id)?, dto).await?))
}

/// DELETE /api/stores/:id
pub async fn delete(CurrentUser(claims): CurrentUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete(&claims, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/seller/stores
pub async fn list_own(user: CurrentUser) -> ApiResult<Json<Vec<Store>>> {
    Ok(Json(service::list_by_seller(user.id()).await?))
}
