use contracts::domain::a004_cart::aggregate::{Cart, CartId};
use contracts::domain::common::BaseAggregate;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;
use crate::shared::data::mapping::{from_json, metadata, parse_uuid, to_json};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_cart")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub items_json: String,
    pub total: i64,
    pub item_count: i32,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Cart {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> anyhow::Result<Self> {
        let base = BaseAggregate::with_metadata(
            CartId::new(parse_uuid("a004_cart.id", &m.id)?),
            metadata(m.created_at, m.updated_at, m.is_deleted, m.version),
        );
        // stored total/item_count are informational, from_parts recomputes them
        Ok(Cart::from_parts(
            base,
            m.user_id,
            from_json("a004_cart.items_json", &m.items_json)?,
        ))
    }
}

fn to_active(cart: &Cart) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(cart.base.id.value().to_string()),
        user_id: Set(cart.user_id.clone()),
        items_json: Set(to_json("items", &cart.items())?),
        total: Set(cart.total()),
        item_count: Set(cart.item_count()),
        is_deleted: Set(cart.base.metadata.is_deleted),
        created_at: Set(Some(cart.base.metadata.created_at)),
        updated_at: Set(Some(cart.base.metadata.updated_at)),
        version: Set(cart.base.metadata.version),
    })
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn get_by_user(user_id: &str) -> anyhow::Result<Option<Cart>> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(conn())
        .await?
        .map(Cart::try_from)
        .transpose()
}

/// Inserts the cart on first save, overwrites it afterwards
pub async fn save(cart: &Cart) -> anyhow::Result<()> {
    let exists = Entity::find_by_id(cart.base.id.value().to_string())
        .one(conn())
        .await?
        .is_some();

    let mut active = to_active(cart)?;
    if exists {
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }
    Ok(())
}
