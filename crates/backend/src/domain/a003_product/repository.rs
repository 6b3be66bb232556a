use anyhow::Context;
use chrono::Utc;
use contracts::domain::a001_category::aggregate::CategoryId;
use contracts::domain::a002_store::aggregate::StoreId;
use contracts::domain::a003_product::aggregate::{Product, ProductId};
use contracts::domain::common::BaseAggregate;
use contracts::shared::money::Money;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, Statement,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::data::mapping::{from_json, metadata, parse_uuid, to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub store_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub compare_at_price: Option<i64>,
    pub stock: i32,
    pub unit: String,
    pub images_json: String,
    pub variants_json: String,
    pub is_active: bool,
    pub rating: f64,
    pub review_count: i32,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Product {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> anyhow::Result<Self> {
        Ok(Product {
            base: BaseAggregate::with_metadata(
                ProductId::new(parse_uuid("a003_product.id", &m.id)?),
                metadata(m.created_at, m.updated_at, m.is_deleted, m.version),
            ),
            store_id: StoreId::new(parse_uuid("a003_product.store_id", &m.store_id)?),
            category_id: CategoryId::new(parse_uuid("a003_product.category_id", &m.category_id)?),
            name: m.name,
            description: m.description,
            price: m.price,
            compare_at_price: m.compare_at_price,
            stock: m.stock,
            unit: m.unit,
            images: from_json("a003_product.images_json", &m.images_json)?,
            variants: from_json("a003_product.variants_json", &m.variants_json)?,
            is_active: m.is_active,
            rating: m.rating,
            review_count: m.review_count,
        })
    }
}

fn to_active(aggregate: &Product) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        store_id: Set(aggregate.store_id.value().to_string()),
        category_id: Set(aggregate.category_id.value().to_string()),
        name: Set(aggregate.name.clone()),
        description: Set(aggregate.description.clone()),
        price: Set(aggregate.price),
        compare_at_price: Set(aggregate.compare_at_price),
        stock: Set(aggregate.stock),
        unit: Set(aggregate.unit.clone()),
        images_json: Set(to_json("images", &aggregate.images)?),
        variants_json: Set(to_json("variants", &aggregate.variants)?),
        is_active: Set(aggregate.is_active),
        rating: Set(aggregate.rating),
        review_count: Set(aggregate.review_count),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    })
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn into_products(models: Vec<Model>) -> anyhow::Result<Vec<Product>> {
    models.into_iter().map(Product::try_from).collect()
}

/// Criteria of the public catalog listing, already resolved to ids
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub in_stock: bool,
    pub page: u64,
    pub limit: u64,
}

/// Active products matching the query, newest first, with the total match count
pub async fn list_filtered(query: &ProductQuery) -> anyhow::Result<(Vec<Product>, u64)> {
    let mut condition = Condition::all()
        .add(Column::IsDeleted.eq(false))
        .add(Column::IsActive.eq(true));

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id.to_string()));
    }
    if let Some(store_id) = query.store_id {
        condition = condition.add(Column::StoreId.eq(store_id.to_string()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Name.contains(search));
    }
    if let Some(min) = query.min_price {
        condition = condition.add(Column::Price.gte(min));
    }
    if let Some(max) = query.max_price {
        condition = condition.add(Column::Price.lte(max));
    }
    if query.in_stock {
        condition = condition.add(Column::Stock.gt(0));
    }

    let paginator = Entity::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .paginate(conn(), query.limit);
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(query.page.saturating_sub(1)).await?;

    Ok((into_products(models)?, total))
}

/// Products of the given stores, including inactive ones
pub async fn list_by_stores(store_ids: &[StoreId]) -> anyhow::Result<Vec<Product>> {
    if store_ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = store_ids.iter().map(|id| id.value().to_string()).collect();
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::StoreId.is_in(ids))
        .order_by_asc(Column::Name)
        .all(conn())
        .await?;
    into_products(models)
}

/// Every non-deleted product, for admins
pub async fn list_all() -> anyhow::Result<Vec<Product>> {
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Name)
        .all(conn())
        .await?;
    into_products(models)
}

/// Loads a product, soft-deleted ones included
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Product>> {
    get_by_id_with(conn(), id).await
}

pub async fn get_by_id_with<C: ConnectionTrait>(db: &C, id: Uuid) -> anyhow::Result<Option<Product>> {
    Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(Product::try_from)
        .transpose()
}

/// Products keyed by id; unknown ids are simply absent
pub async fn get_many(ids: &[ProductId]) -> anyhow::Result<HashMap<ProductId, Product>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let keys: Vec<String> = ids.iter().map(|id| id.value().to_string()).collect();
    let models = Entity::find()
        .filter(Column::Id.is_in(keys))
        .all(conn())
        .await?;
    Ok(into_products(models)?
        .into_iter()
        .map(|p| (p.base.id, p))
        .collect())
}

pub async fn insert(aggregate: &Product) -> anyhow::Result<Uuid> {
    insert_with(conn(), aggregate).await
}

pub async fn insert_with<C: ConnectionTrait>(db: &C, aggregate: &Product) -> anyhow::Result<Uuid> {
    to_active(aggregate)?.insert(db).await?;
    Ok(aggregate.base.id.value())
}

pub async fn update(aggregate: &Product) -> anyhow::Result<()> {
    let mut active = to_active(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

/// Relative stock change: negative `delta` takes stock out, positive puts it back
pub async fn adjust_stock(id: ProductId, delta: i32) -> anyhow::Result<()> {
    adjust_stock_with(conn(), id, delta).await
}

/// Adds `delta` to the stored stock in a single statement
pub async fn adjust_stock_with<C: ConnectionTrait>(
    db: &C,
    id: ProductId,
    delta: i32,
) -> anyhow::Result<()> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a003_product SET stock = stock + ?, updated_at = ?, version = version + 1 WHERE id = ?",
            [
                delta.into(),
                Utc::now().into(),
                id.value().to_string().into(),
            ],
        ))
        .await
        .with_context(|| format!("Failed to adjust stock of product {}", id))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Product {} not found while adjusting stock", id);
    }
    Ok(())
}

pub async fn update_rating(id: ProductId, rating: f64, review_count: i32) -> anyhow::Result<()> {
    use sea_orm::sea_query::Expr;
    Entity::update_many()
        .col_expr(Column::Rating, Expr::value(rating))
        .col_expr(Column::ReviewCount, Expr::value(review_count))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.value().to_string()))
        .exec(conn())
        .await
        .context("Failed to update product rating")?;
    Ok(())
}
