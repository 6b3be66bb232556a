use contracts::domain::a003_product::aggregate::ProductId;
use contracts::domain::a006_review::aggregate::{Review, ReviewId};
use contracts::domain::common::BaseAggregate;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::data::mapping::{metadata, parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a006_review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Review {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> anyhow::Result<Self> {
        Ok(Review {
            base: BaseAggregate::with_metadata(
                ReviewId::new(parse_uuid("a006_review.id", &m.id)?),
                metadata(m.created_at, m.updated_at, m.is_deleted, m.version),
            ),
            product_id: ProductId::new(parse_uuid("a006_review.product_id", &m.product_id)?),
            user_id: m.user_id,
            user_name: m.user_name,
            rating: m.rating,
            title: m.title,
            comment: m.comment,
        })
    }
}

fn to_active(aggregate: &Review) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        product_id: Set(aggregate.product_id.value().to_string()),
        user_id: Set(aggregate.user_id.clone()),
        user_name: Set(aggregate.user_name.clone()),
        rating: Set(aggregate.rating),
        title: Set(aggregate.title.clone()),
        comment: Set(aggregate.comment.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Newest first
pub async fn list_by_product(product_id: ProductId) -> anyhow::Result<Vec<Review>> {
    Entity::find()
        .filter(Column::ProductId.eq(product_id.value().to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Review::try_from)
        .collect()
}

pub async fn find_by_product_and_user(
    product_id: ProductId,
    user_id: &str,
) -> anyhow::Result<Option<Review>> {
    Entity::find()
        .filter(Column::ProductId.eq(product_id.value().to_string()))
        .filter(Column::UserId.eq(user_id))
        .one(conn())
        .await?
        .map(Review::try_from)
        .transpose()
}

/// Every rating given to a product
pub async fn ratings_for(product_id: ProductId) -> anyhow::Result<Vec<i32>> {
    let ratings = Entity::find()
        .select_only()
        .column(Column::Rating)
        .filter(Column::ProductId.eq(product_id.value().to_string()))
        .filter(Column::IsDeleted.eq(false))
        .into_tuple::<i32>()
        .all(conn())
        .await?;
    Ok(ratings)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Review>> {
    Entity::find_by_id(id.to_string())
        .one(conn())
        .await?
        .map(Review::try_from)
        .transpose()
}

pub async fn insert(aggregate: &Review) -> anyhow::Result<Uuid> {
    to_active(aggregate).insert(conn()).await?;
    Ok(aggregate.base.id.value())
}

/// Hard delete, so the author may review the product again
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
