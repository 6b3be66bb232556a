use anyhow::{Context, Result};
use contracts::system::users::{User, UserRole};
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement};

use crate::shared::data::db::get_connection;

const USER_COLUMNS: &str =
    "id, email, name, phone, role, is_active, created_at, updated_at, last_login_at";

fn row_to_user(row: &QueryResult) -> Result<User> {
    let role: String = row.try_get("", "role")?;
    Ok(User {
        id: row.try_get("", "id")?,
        email: row.try_get("", "email")?,
        name: row.try_get("", "name")?,
        phone: row.try_get("", "phone")?,
        role: role
            .parse::<UserRole>()
            .map_err(|e| anyhow::anyhow!(e))?,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
    })
}

/// Create user with password hash
pub async fn create_with_password(user: &User, password_hash: &str) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sys_users (id, email, password_hash, name, phone, role, is_active, created_at, updated_at, last_login_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            [
                user.id.clone().into(),
                user.email.clone().into(),
                password_hash.to_string().into(),
                user.name.clone().into(),
                user.phone.clone().into(),
                user.role.as_str().into(),
                (if user.is_active { 1 } else { 0 }).into(),
                user.created_at.clone().into(),
                user.updated_at.clone().into(),
                user.last_login_at.clone().into(),
            ],
        ))
        .await
        .context("Failed to insert user")?;

    Ok(())
}

pub async fn get_by_id(id: &str) -> Result<Option<User>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!("SELECT {} FROM sys_users WHERE id = ?", USER_COLUMNS),
            [id.into()],
        ))
        .await?;

    row.as_ref().map(row_to_user).transpose()
}

/// Lookup by login email, case-insensitive
pub async fn get_by_email(email: &str) -> Result<Option<User>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!(
                "SELECT {} FROM sys_users WHERE email = ? COLLATE NOCASE",
                USER_COLUMNS
            ),
            [email.into()],
        ))
        .await?;

    row.as_ref().map(row_to_user).transpose()
}

pub async fn get_password_hash(user_id: &str) -> Result<Option<String>> {
    let row = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

pub async fn list_all() -> Result<Vec<User>> {
    let rows = get_connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                "SELECT {} FROM sys_users ORDER BY created_at DESC",
                USER_COLUMNS
            ),
        ))
        .await?;

    rows.iter().map(row_to_user).collect()
}

/// Persist name, phone, role and active flag
pub async fn update(user: &User) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_users
             SET name = ?, phone = ?, role = ?, is_active = ?, updated_at = ?
             WHERE id = ?",
            [
                user.name.clone().into(),
                user.phone.clone().into(),
                user.role.as_str().into(),
                (if user.is_active { 1 } else { 0 }).into(),
                user.updated_at.clone().into(),
                user.id.clone().into(),
            ],
        ))
        .await
        .context("Failed to update user")?;

    Ok(())
}

/// Delete user (hard delete)
pub async fn delete(id: &str) -> Result<bool> {
    let result = get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_users WHERE id = ?",
            [id.into()],
        ))
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_last_login(id: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_users SET last_login_at = ? WHERE id = ?",
            [now.into(), id.into()],
        ))
        .await
        .context("Failed to update last login")?;

    Ok(())
}

pub async fn count_users() -> Result<usize> {
    let row = get_connection()
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users".to_string(),
        ))
        .await?;

    match row {
        Some(row) => {
            let count: i64 = row.try_get("", "count")?;
            Ok(count as usize)
        }
        None => Ok(0),
    }
}

pub async fn update_password(id: &str, password_hash: &str) -> Result<()> {
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE sys_users SET password_hash = ?, updated_at = ? WHERE id = ?",
            [
                password_hash.into(),
                chrono::Utc::now().to_rfc3339().into(),
                id.into(),
            ],
        ))
        .await
        .context("Failed to update password")?;

    Ok(())
}
