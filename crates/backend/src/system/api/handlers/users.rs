use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::system::users::{CreateUserDto, UpdateUserDto, User};

use crate::shared::error::ApiResult;
use crate::system::auth::extractor::CurrentUser;
use crate::system::users::service;

/// GET /api/users
pub async fn list(_admin: CurrentUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(service::list_all().await?))
}

/// GET /api/users/:id
pub async fn get_by_id(_admin: CurrentUser, Path(id): Path<String>) -> ApiResult<Json<User>> {
    Ok(Json(service::get_by_id(&id).await?))
}

/// POST /api/users, any role
pub async fn create(
    _admin: CurrentUser,
    Json(dto): Json<CreateUserDto>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = service::create(dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id
pub async fn update(
    admin: CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<UpdateUserDto>,
) -> ApiResult<Json<User>> {
    dto.id = id;
    Ok(Json(service::update(dto, admin.id()).await?))
}

/// DELETE /api/users/:id
pub async fn delete(admin: CurrentUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete(&id, admin.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
