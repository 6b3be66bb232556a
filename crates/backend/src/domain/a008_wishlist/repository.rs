use contracts::domain::a008_wishlist::aggregate::{Wishlist, WishlistId};
use contracts::domain::common::BaseAggregate;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;
use crate::shared::data::mapping::{from_json, metadata, parse_uuid, to_json};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a008_wishlist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub product_ids_json: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Wishlist {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> anyhow::Result<Self> {
        Ok(Wishlist {
            base: BaseAggregate::with_metadata(
                WishlistId::new(parse_uuid("a008_wishlist.id", &m.id)?),
                metadata(m.created_at, m.updated_at, m.is_deleted, m.version),
            ),
            user_id: m.user_id,
            product_ids: from_json("a008_wishlist.product_ids_json", &m.product_ids_json)?,
        })
    }
}

fn to_active(wishlist: &Wishlist) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(wishlist.base.id.value().to_string()),
        user_id: Set(wishlist.user_id.clone()),
        product_ids_json: Set(to_json("product_ids", &wishlist.product_ids)?),
        is_deleted: Set(wishlist.base.metadata.is_deleted),
        created_at: Set(Some(wishlist.base.metadata.created_at)),
        updated_at: Set(Some(wishlist.base.metadata.updated_at)),
        version: Set(wishlist.base.metadata.version),
    })
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn get_by_user(user_id: &str) -> anyhow::Result<Option<Wishlist>> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(conn())
        .await?
        .map(Wishlist::try_from)
        .transpose()
}

pub async fn save(wishlist: &Wishlist) -> anyhow::Result<()> {
    let exists = Entity::find_by_id(wishlist.base.id.value().to_string())
        .one(conn())
        .await?
        .is_some();

    let mut active = to_active(wishlist)?;
    if exists {
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }
    Ok(())
}
