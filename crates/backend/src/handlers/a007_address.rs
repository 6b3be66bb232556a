use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::domain::a007_address::aggregate::{Address, AddressDto};

use crate::domain::a007_address::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/addresses
pub async fn list(user: CurrentUser) -> ApiResult<Json<Vec<Address>>> {
    Ok(Json(service::list(user.id()).await?))
}

/// POST /api/addresses
pub async fn create(
    user: CurrentUser,
    Json(dto): Json<AddressDto>,
) -> ApiResult<(StatusCode, Json<Address>)> {
    let address = service::create(user.id(), dto).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// PUT /api/addresses/:id
pub async fn update(
    user: CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<AddressDto>,
) -> ApiResult<Json<Address>> {
    Ok(Json(service::update(user.id(), parse_id(&id)?, dto).await?))
}

/// DELETE /api/addresses/:id
pub async fn delete(user: CurrentUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete(user.id(), parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
