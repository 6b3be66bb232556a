use axum::{
    extract::{Json, Path, Query},
    http::StatusCode,
};
use contracts::domain::a005_order::aggregate::{
    Order, OrderFilter, PlaceOrderDto, UpdateOrderStatusDto, UpdatePaymentStatusDto,
};
use contracts::shared::pagination::Page;

use crate::domain::a005_order::service;
use crate::shared::error::{parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// POST /api/orders, checkout of the caller's cart
pub async fn place(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<PlaceOrderDto>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = service::place(&claims, dto).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list_own(
    CurrentUser(claims): CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Page<Order>>> {
    Ok(Json(service::list_own(&claims, filter).await?))
}

/// GET /api/seller/orders
pub async fn list_for_seller(
    CurrentUser(claims): CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Page<Order>>> {
    Ok(Json(service::list_for_seller(&claims, filter).await?))
}

/// GET /api/admin/orders
pub async fn list_all(Query(filter): Query<OrderFilter>) -> ApiResult<Json<Page<Order>>> {
    Ok(Json(service::list_all(filter).await?))
}

/// GET /api/orders/:id
pub async fn get_by_id(CurrentUser(claims): CurrentUser, Path(id): Path<String>) -> ApiResult<Json<Order>> {
    Ok(Json(service::get(&claims, parse_id(&id)?).await?))
}

/// POST /api/orders/:id/cancel
pub async fn cancel(CurrentUser(claims): CurrentUser, Path(id): Path<String>) -> ApiResult<Json<Order>> {
    Ok(Json(service::cancel(&claims, parse_id(&id)?).await?))
}

/// PUT /api/orders/:id/status
pub async fn update_status(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<UpdateOrderStatusDto>,
) -> ApiResult<Json<Order>> {
    Ok(Json(
        service::update_status(&claims, parse_id(&id)?, dto.status).await?,
    ))
}

/// PUT /api/orders/:id/payment-status
pub async fn update_payment_status(
    Path(id): Path<String>,
    Json(dto): Json<UpdatePaymentStatusDto>,
) -> ApiResult<Json<Order>> {
    Ok(Json(
        service::update_payment_status(parse_id(&id)?, dto.payment_status).await?,
    ))
}
