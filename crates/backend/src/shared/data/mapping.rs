use anyhow::Context;
use chrono::{DateTime, Utc};
use contracts::domain::common::EntityMetadata;
use uuid::Uuid;

/// Lifecycle metadata from the common table columns
pub fn metadata(
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    is_deleted: bool,
    version: i32,
) -> EntityMetadata {
    EntityMetadata {
        created_at: created_at.unwrap_or_else(Utc::now),
        updated_at: updated_at.unwrap_or_else(Utc::now),
        is_deleted,
        version,
    }
}

pub fn parse_uuid(column: &str, value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid uuid in {}: {}", column, value))
}

/// Decodes a JSON text column
pub fn from_json<T: serde::de::DeserializeOwned>(column: &str, value: &str) -> anyhow::Result<T> {
    serde_json::from_str(value).with_context(|| format!("Invalid JSON in {}", column))
}

pub fn to_json<T: serde::Serialize>(column: &str, value: &T) -> anyhow::Result<String> {
    serde_json::to_string(value).with_context(|| format!("Failed to encode {}", column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keeps_stored_values() {
        let created = Utc::now() - chrono::Duration::days(2);
        let meta = metadata(Some(created), None, true, 7);
        assert_eq!(meta.created_at, created);
        assert!(meta.is_deleted);
        assert_eq!(meta.version, 7);
    }

    #[test]
    fn test_json_columns() {
        let ids: Vec<String> = from_json("ids", r#"["a","b"]"#).unwrap();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(from_json::<Vec<String>>("ids", "{").is_err());
        assert_eq!(to_json("ids", &ids).unwrap(), r#"["a","b"]"#);
        assert!(parse_uuid("id", "nope").is_err());
    }
}
