use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Business tables, created on first start
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_category",
        r#"
        CREATE TABLE a001_category (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            image_url TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_store",
        r#"
        CREATE TABLE a002_store (
            id TEXT PRIMARY KEY NOT NULL,
            seller_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            address TEXT NOT NULL,
            phone TEXT,
            logo_url TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a003_product",
        r#"
        CREATE TABLE a003_product (
            id TEXT PRIMARY KEY NOT NULL,
            store_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            price INTEGER NOT NULL,
            compare_at_price INTEGER,
            stock INTEGER NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT '',
            images_json TEXT NOT NULL DEFAULT '[]',
            variants_json TEXT NOT NULL DEFAULT '[]',
            is_active INTEGER NOT NULL DEFAULT 1,
            rating REAL NOT NULL DEFAULT 0,
            review_count INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a004_cart",
        r#"
        CREATE TABLE a004_cart (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL UNIQUE,
            items_json TEXT NOT NULL DEFAULT '[]',
            total INTEGER NOT NULL DEFAULT 0,
            item_count INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a005_order",
        r#"
        CREATE TABLE a005_order (
            id TEXT PRIMARY KEY NOT NULL,
            order_number TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            items_json TEXT NOT NULL,
            store_ids TEXT NOT NULL DEFAULT '',
            subtotal INTEGER NOT NULL,
            tax INTEGER NOT NULL,
            delivery_fee INTEGER NOT NULL,
            total INTEGER NOT NULL,
            status TEXT NOT NULL,
            payment_status TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            delivery_address_id TEXT NOT NULL,
            notes TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a006_review",
        r#"
        CREATE TABLE a006_review (
            id TEXT PRIMARY KEY NOT NULL,
            product_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            user_name TEXT NOT NULL,
            rating INTEGER NOT NULL,
            title TEXT,
            comment TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0,
            UNIQUE (product_id, user_id)
        );
        "#,
    ),
    (
        "a007_address",
        r#"
        CREATE TABLE a007_address (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            label TEXT NOT NULL,
            line1 TEXT NOT NULL,
            line2 TEXT,
            city TEXT NOT NULL,
            postal_code TEXT NOT NULL,
            phone TEXT,
            is_default INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a008_wishlist",
        r#"
        CREATE TABLE a008_wishlist (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL UNIQUE,
            product_ids_json TEXT NOT NULL DEFAULT '[]',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

/// Builds the sqlx connection URL for a database file
pub fn sqlite_url(db_file: &Path) -> anyhow::Result<String> {
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators for Windows drive paths
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_url = sqlite_url(db_file)?;
    tracing::info!("Opening database {}", db_url);
    let conn = Database::connect(&db_url).await?;
    create_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Creates every business table that does not exist yet
pub async fn create_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for (table, ddl) in SCHEMA {
        ensure_table(conn, table, ddl).await?;
    }
    Ok(())
}

/// Private in-memory database with the full schema, for tests
#[cfg(test)]
pub async fn open_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    // every pooled connection would otherwise get its own empty database
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(options).await?;
    create_schema(&conn).await?;
    Ok(conn)
}

/// Runs `ddl` when `table` is missing from sqlite_master
pub async fn ensure_table<C: ConnectionTrait>(conn: &C, table: &str, ddl: &str) -> anyhow::Result<()> {
    let existing = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?",
            [table.into()],
        ))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", table);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, ddl.to_string()))
            .await?;
    }
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_for_absolute_path() {
        let url = sqlite_url(Path::new("/var/lib/quickcart/app.db")).unwrap();
        assert_eq!(url, "sqlite:///var/lib/quickcart/app.db?mode=rwc");
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let conn = open_in_memory().await.unwrap();
        create_schema(&conn).await.unwrap();
        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'a00%'".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), SCHEMA.len());
    }

    #[test]
    fn test_schema_covers_all_collections() {
        let tables: Vec<&str> = SCHEMA.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            tables,
            vec![
                "a001_category",
                "a002_store",
                "a003_product",
                "a004_cart",
                "a005_order",
                "a006_review",
                "a007_address",
                "a008_wishlist"
            ]
        );
        for (name, ddl) in SCHEMA {
            assert!(ddl.contains(&format!("CREATE TABLE {} (", name)));
        }
    }
}
