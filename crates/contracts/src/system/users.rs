use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an account. Sellers own stores; admins manage everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Seller,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Seller => "seller",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Sellers and admins may manage stores and products
    pub fn can_sell(&self) -> bool {
        matches!(self, UserRole::Seller | UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(UserRole::Customer),
            "seller" => Ok(UserRole::Seller),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

/// Admin-side update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

/// Self-service profile update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    pub old_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_and_display() {
        for role in [UserRole::Customer, UserRole::Seller, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
            assert_eq!(role.to_string(), role.as_str());
        }
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(!UserRole::Customer.can_sell());
        assert!(UserRole::Seller.can_sell());
        assert!(UserRole::Admin.can_sell());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Seller.is_admin());
    }

    #[test]
    fn test_create_dto_defaults_to_customer() {
        let dto: CreateUserDto = serde_json::from_str(
            r#"{"email":"a@b.c","password":"secret1","name":"A","phone":null}"#,
        )
        .unwrap();
        assert_eq!(dto.role, UserRole::Customer);
    }
}
