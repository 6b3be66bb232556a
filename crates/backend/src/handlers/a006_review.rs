use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::domain::a006_review::aggregate::{Review, ReviewDto};

use crate::domain::a006_review::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/products/:id/reviews
pub async fn list_for_product(Path(product_id): Path<String>) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(service::list_for_product(parse_id(&product_id)?).await?))
}

/// POST /api/products/:id/reviews
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Path(product_id): Path<String>,
    Json(dto): Json<ReviewDto>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = service::create(&claims, parse_id(&product_id)?, dto).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// DELETE /api/reviews/:id
pub async fn delete(CurrentUser(claims): CurrentUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete(&claims, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
