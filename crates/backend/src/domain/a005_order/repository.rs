use anyhow::anyhow;
use contracts::domain::a002_store::aggregate::StoreId;
use contracts::domain::a005_order::aggregate::{Order, OrderId, OrderStatus};
use contracts::domain::common::BaseAggregate;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::data::mapping::{from_json, metadata, parse_uuid, to_json};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub items_json: String,
    /// Comma-wrapped list of store ids (",id1,id2,") for seller lookups
    pub store_ids: String,
    pub subtotal: i64,
    pub tax: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub delivery_address_id: String,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> anyhow::Result<Self> {
        Ok(Order {
            base: BaseAggregate::with_metadata(
                OrderId::new(parse_uuid("a005_order.id", &m.id)?),
                metadata(m.created_at, m.updated_at, m.is_deleted, m.version),
            ),
            order_number: m.order_number,
            user_id: m.user_id,
            items: from_json("a005_order.items_json", &m.items_json)?,
            subtotal: m.subtotal,
            tax: m.tax,
            delivery_fee: m.delivery_fee,
            total: m.total,
            status: m.status.parse().map_err(|e: String| anyhow!(e))?,
            payment_status: m.payment_status.parse().map_err(|e: String| anyhow!(e))?,
            payment_method: m.payment_method.parse().map_err(|e: String| anyhow!(e))?,
            delivery_address_id: m.delivery_address_id,
            notes: m.notes,
        })
    }
}

/// Encodes the distinct stores of an order as ",a,b,"
pub fn encode_store_ids(order: &Order) -> String {
    let mut ids: Vec<String> = order
        .items
        .iter()
        .map(|line| line.store_id.value().to_string())
        .collect();
    ids.sort();
    ids.dedup();
    format!(",{},", ids.join(","))
}

fn to_active(order: &Order) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(order.base.id.value().to_string()),
        order_number: Set(order.order_number.clone()),
        user_id: Set(order.user_id.clone()),
        items_json: Set(to_json("items", &order.items)?),
        store_ids: Set(encode_store_ids(order)),
        subtotal: Set(order.subtotal),
        tax: Set(order.tax),
        delivery_fee: Set(order.delivery_fee),
        total: Set(order.total),
        status: Set(order.status.as_str().to_string()),
        payment_status: Set(order.payment_status.as_str().to_string()),
        payment_method: Set(order.payment_method.as_str().to_string()),
        delivery_address_id: Set(order.delivery_address_id.clone()),
        notes: Set(order.notes.clone()),
        is_deleted: Set(order.base.metadata.is_deleted),
        created_at: Set(Some(order.base.metadata.created_at)),
        updated_at: Set(Some(order.base.metadata.updated_at)),
        version: Set(order.base.metadata.version),
    })
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Whose orders a listing covers
#[derive(Debug, Clone)]
pub enum OrderScope {
    All,
    User(String),
    Stores(Vec<StoreId>),
}

pub async fn exists_number(order_number: &str) -> anyhow::Result<bool> {
    let count = Entity::find()
        .filter(Column::OrderNumber.eq(order_number))
        .count(conn())
        .await?;
    Ok(count > 0)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Order>> {
    Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?
        .map(Order::try_from)
        .transpose()
}

/// Newest first, with the total count of the scope
pub async fn list(
    scope: &OrderScope,
    status: Option<OrderStatus>,
    page: u64,
    limit: u64,
) -> anyhow::Result<(Vec<Order>, u64)> {
    let mut condition = Condition::all().add(Column::IsDeleted.eq(false));
    match scope {
        OrderScope::All => {}
        OrderScope::User(user_id) => {
            condition = condition.add(Column::UserId.eq(user_id.as_str()));
        }
        OrderScope::Stores(store_ids) => {
            if store_ids.is_empty() {
                return Ok((Vec::new(), 0));
            }
            let any_store = store_ids.iter().fold(Condition::any(), |acc, id| {
                acc.add(Column::StoreIds.contains(format!(",{},", id.value())))
            });
            condition = condition.add(any_store);
        }
    }
    if let Some(status) = status {
        condition = condition.add(Column::Status.eq(status.as_str()));
    }

    let paginator = Entity::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .paginate(conn(), limit);
    let total = paginator.num_items().await?;
    let orders = paginator
        .fetch_page(page.saturating_sub(1))
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((orders, total))
}

pub async fn insert(order: &Order) -> anyhow::Result<Uuid> {
    to_active(order)?.insert(conn()).await?;
    Ok(order.base.id.value())
}

pub async fn update(order: &Order) -> anyhow::Result<()> {
    let mut active = to_active(order)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}
