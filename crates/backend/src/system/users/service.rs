use chrono::Utc;
use contracts::system::users::{
    ChangePasswordDto, CreateUserDto, UpdateProfileDto, UpdateUserDto, User, UserRole,
};

use super::repository;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::password;

/// Basic shape check: one `@` with text on both sides and a dot in the domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Roles an anonymous visitor may pick when registering
pub fn can_self_register(role: UserRole) -> bool {
    matches!(role, UserRole::Customer | UserRole::Seller)
}

/// Create a new user
pub async fn create(dto: CreateUserDto) -> ApiResult<User> {
    let email = dto.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if dto.name.trim().is_empty() {
        return Err(ApiError::Validation("Name cannot be empty".into()));
    }
    if repository::get_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".into()));
    }
    password::validate_password_strength(&dto.password).map_err(ApiError::Validation)?;

    let password_hash = password::hash_password(&dto.password)?;
    let now = Utc::now().to_rfc3339();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        name: dto.name.trim().to_string(),
        phone: dto.phone,
        role: dto.role,
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
    };

    repository::create_with_password(&user, &password_hash).await?;
    tracing::info!("User {} registered as {}", user.email, user.role);

    Ok(user)
}

/// Self-registration; admins can only be created by admins or at bootstrap
pub async fn register(dto: CreateUserDto) -> ApiResult<User> {
    if !can_self_register(dto.role) {
        return Err(ApiError::Validation(format!(
            "Role '{}' cannot be chosen at registration",
            dto.role
        )));
    }
    create(dto).await
}

/// Admin-side update of name, phone, role and active flag
pub async fn update(dto: UpdateUserDto, requester_id: &str) -> ApiResult<User> {
    let mut user = get_by_id(&dto.id).await?;

    if dto.id == requester_id && (!dto.is_active || !dto.role.is_admin()) {
        return Err(ApiError::Validation(
            "You cannot deactivate or demote your own account".into(),
        ));
    }
    if dto.name.trim().is_empty() {
        return Err(ApiError::Validation("Name cannot be empty".into()));
    }

    user.name = dto.name.trim().to_string();
    user.phone = dto.phone;
    user.role = dto.role;
    user.is_active = dto.is_active;
    user.updated_at = Utc::now().to_rfc3339();

    repository::update(&user).await?;
    Ok(user)
}

pub async fn update_profile(user_id: &str, dto: UpdateProfileDto) -> ApiResult<User> {
    let mut user = get_by_id(user_id).await?;
    if dto.name.trim().is_empty() {
        return Err(ApiError::Validation("Name cannot be empty".into()));
    }
    user.name = dto.name.trim().to_string();
    user.phone = dto.phone;
    user.updated_at = Utc::now().to_rfc3339();

    repository::update(&user).await?;
    Ok(user)
}

pub async fn delete(id: &str, requester_id: &str) -> ApiResult<()> {
    if id == requester_id {
        return Err(ApiError::Validation("You cannot delete your own account".into()));
    }
    if repository::delete(id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("User"))
    }
}

pub async fn get_by_id(id: &str) -> ApiResult<User> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub async fn list_all() -> ApiResult<Vec<User>> {
    Ok(repository::list_all().await?)
}

/// Change own password; the current password is always required
pub async fn change_password(user_id: &str, dto: ChangePasswordDto) -> ApiResult<()> {
    let current_hash = repository::get_password_hash(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if !password::verify_password(&dto.old_password, &current_hash)? {
        return Err(ApiError::Validation("Current password is incorrect".into()));
    }
    password::validate_password_strength(&dto.new_password).map_err(ApiError::Validation)?;

    let new_hash = password::hash_password(&dto.new_password)?;
    repository::update_password(user_id, &new_hash).await?;

    Ok(())
}

/// Verify login credentials
pub async fn verify_credentials(email: &str, password: &str) -> ApiResult<User> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());

    let user = repository::get_by_email(email.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_hash = repository::get_password_hash(&user.id)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(password, &password_hash)? {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("User account is inactive".into()));
    }

    if let Err(e) = repository::update_last_login(&user.id).await {
        tracing::warn!("Failed to record last login for {}: {:#}", user.id, e);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("  a.b@shop.co.in "));
        assert!(!is_valid_email("asha.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("asha@localhost"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("as ha@example.com"));
    }

    #[test]
    fn test_self_registration_roles() {
        assert!(can_self_register(UserRole::Customer));
        assert!(can_self_register(UserRole::Seller));
        assert!(!can_self_register(UserRole::Admin));
    }
}
