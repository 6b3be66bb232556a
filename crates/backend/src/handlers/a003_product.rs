use axum::{
    extract::{Json, Path, Query},
    http::StatusCode,
};
use contracts::domain::a003_product::aggregate::{Product, ProductDto, ProductFilter};
use contracts::shared::pagination::Page;

use crate::domain::a003_product::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/products?category=&store=&search=&minPrice=&maxPrice=&inStock=&page=&limit=
pub async fn list(Query(filter): Query<ProductFilter>) -> ApiResult<Json<Page<Product>>> {
    Ok(Json(service::list(filter).await?))
}

/// GET /api/products/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<Json<Product>> {
    Ok(Json(service::get_public(parse_id(&id)?).await?))
}

/// POST /api/products
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<ProductDto>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = service::create(&claims, dto).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<ProductDto>,
) -> ApiResult<Json<Product>> {
    Ok(Json(service::update(&claims, parse_id(&id)?, dto).await?))
}

/// DELETE /api/products/:id
pub async fn delete(CurrentUser(claims): CurrentUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    service::delete(&claims, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/seller/products
pub async fn list_own(CurrentUser(claims): CurrentUser) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(service::list_for_seller(&claims).await?))
}
