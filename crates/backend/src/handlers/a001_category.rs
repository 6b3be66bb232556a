use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::domain::a001_category::aggregate::{Category, CategoryDto};

use crate::domain::a001_category::service;
use crate::shared::error::{parse_id, ApiResult};

/// GET /api/categories
pub async fn list() -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(service::list(true).await?))
}

/// GET /api/categories/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Category>> {
    Ok(Json(service::get_by_id(parse_id(&id)?).await?))
}

/// POST /api/categories
pub async fn create(Json(dto): Json<CategoryDto>) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = service::create(dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<CategoryDto>,
) -> ApiResult<Json<Category>> {
    Ok(Json(service::update(parse_id(&id)?, dto).await?))
}

/// DELETE /api/categories/:id
pub async fn delete(Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
