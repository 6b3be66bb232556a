use axum::{extract::Json, http::StatusCode};
use contracts::shared::api::ApiMessage;
use contracts::system::auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use contracts::system::users::{ChangePasswordDto, CreateUserDto, UpdateProfileDto, User};

use crate::shared::error::ApiResult;
use crate::system::auth::extractor::CurrentUser;
use crate::system::{auth::jwt, users::service as user_service};

fn login_response(user: User) -> ApiResult<LoginResponse> {
    let access_token = jwt::generate_access_token(&user)?;
    Ok(LoginResponse {
        access_token,
        token_type: "Bearer".into(),
        expires_in: jwt::token_lifetime_secs(),
        user: user.into(),
    })
}

/// POST /api/auth/register
pub async fn register(
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let user = user_service::register(CreateUserDto {
        email: request.email,
        password: request.password,
        name: request.name,
        phone: request.phone,
        role: request.role,
    })
    .await?;

    Ok((StatusCode::CREATED, Json(login_response(user)?)))
}

/// POST /api/auth/login
pub async fn login(Json(request): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let user = user_service::verify_credentials(&request.email, &request.password).await?;
    tracing::info!("User {} logged in", user.email);
    Ok(Json(login_response(user)?))
}

/// GET /api/auth/me
pub async fn current_user(user: CurrentUser) -> ApiResult<Json<UserInfo>> {
    let user = user_service::get_by_id(user.id()).await?;
    Ok(Json(user.into()))
}

/// PUT /api/auth/me
pub async fn update_profile(
    user: CurrentUser,
    Json(dto): Json<UpdateProfileDto>,
) -> ApiResult<Json<UserInfo>> {
    let user = user_service::update_profile(user.id(), dto).await?;
    Ok(Json(user.into()))
}

/// POST /api/auth/change-password
pub async fn change_password(
    user: CurrentUser,
    Json(dto): Json<ChangePasswordDto>,
) -> ApiResult<Json<ApiMessage>> {
    user_service::change_password(user.id(), dto).await?;
    Ok(Json(ApiMessage::ok("Password changed")))
}
