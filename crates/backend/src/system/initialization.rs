use anyhow::{Context, Result};
use contracts::system::users::{CreateUserDto, UserRole};

use crate::shared::config;
use crate::shared::data::db::{ensure_table, get_connection};
use crate::system::users::{repository, service};

const SYS_USERS_DDL: &str = r#"
    CREATE TABLE sys_users (
        id TEXT PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        phone TEXT,
        role TEXT NOT NULL DEFAULT 'customer',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        last_login_at TEXT
    );
"#;

const SYS_SETTINGS_DDL: &str = r#"
    CREATE TABLE sys_settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

/// Create the users and settings tables when missing
pub async fn apply_auth_schema() -> Result<()> {
    let conn = get_connection();
    ensure_table(conn, "sys_users", SYS_USERS_DDL)
        .await
        .context("Failed to create sys_users")?;
    ensure_table(conn, "sys_settings", SYS_SETTINGS_DDL)
        .await
        .context("Failed to create sys_settings")?;
    Ok(())
}

/// Create the configured admin account when the users table is empty
pub async fn ensure_admin_user_exists() -> Result<()> {
    if repository::count_users().await? > 0 {
        return Ok(());
    }

    tracing::info!("No users found. Creating default admin user...");
    let admin = &config::get().admin;

    let user = service::create(CreateUserDto {
        email: admin.email.clone(),
        password: admin.password.clone(),
        name: "Administrator".to_string(),
        phone: None,
        role: UserRole::Admin,
    })
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create admin user: {}", e))?;

    tracing::warn!("Default admin user created: {} ({})", user.email, user.id);
    tracing::warn!("Change the admin password after the first login");

    Ok(())
}
