use chrono::Utc;
use contracts::domain::a007_address::aggregate::{Address, AddressId};
use contracts::domain::common::BaseAggregate;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::data::mapping::{metadata, parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a007_address")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub is_default: bool,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Address {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> anyhow::Result<Self> {
        Ok(Address {
            base: BaseAggregate::with_metadata(
                AddressId::new(parse_uuid("a007_address.id", &m.id)?),
                metadata(m.created_at, m.updated_at, m.is_deleted, m.version),
            ),
            user_id: m.user_id,
            label: m.label,
            line1: m.line1,
            line2: m.line2,
            city: m.city,
            postal_code: m.postal_code,
            phone: m.phone,
            is_default: m.is_default,
        })
    }
}

fn to_active(aggregate: &Address) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        user_id: Set(aggregate.user_id.clone()),
        label: Set(aggregate.label.clone()),
        line1: Set(aggregate.line1.clone()),
        line2: Set(aggregate.line2.clone()),
        city: Set(aggregate.city.clone()),
        postal_code: Set(aggregate.postal_code.clone()),
        phone: Set(aggregate.phone.clone()),
        is_default: Set(aggregate.is_default),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Default address first, then oldest first
pub async fn list_by_user(user_id: &str) -> anyhow::Result<Vec<Address>> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::IsDefault)
        .order_by_asc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Address::try_from)
        .collect()
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Address>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(Address::try_from)
        .transpose()
}

pub async fn insert(aggregate: &Address) -> anyhow::Result<Uuid> {
    to_active(aggregate).insert(conn()).await?;
    Ok(aggregate.base.id.value())
}

pub async fn update(aggregate: &Address) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

/// Clears the default flag on every address of the user except `keep`
pub async fn clear_default(user_id: &str, keep: Uuid) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::IsDefault, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsDefault.eq(true))
        .filter(Column::Id.ne(keep.to_string()))
        .exec(conn())
        .await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::IsDefault, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
