use super::repository::{self, OrderScope};
use crate::domain::{a002_store, a003_product, a004_cart, a007_address};
use crate::shared::config;
use crate::shared::data::db::get_connection;
use crate::shared::error::{ApiError, ApiResult};
use chrono::Utc;
use contracts::domain::a002_store::aggregate::StoreId;
use contracts::domain::a005_order::aggregate::{
    Order, OrderFilter, OrderStatus, PaymentStatus, PlaceOrderDto,
};
use contracts::domain::a005_order::checkout::{format_order_number, plan_checkout, StockDecrement};
use contracts::shared::money::format_minor_units;
use contracts::shared::pagination::{Page, PageQuery};
use contracts::system::auth::TokenClaims;
use rand::Rng;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

const ORDER_SUFFIX_LEN: usize = 6;
const ORDER_SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_NUMBER_ATTEMPTS: usize = 10;

/// Random uppercase alphanumeric suffix of an order number
pub fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..ORDER_SUFFIX_LEN)
        .map(|_| ORDER_SUFFIX_ALPHABET[rng.gen_range(0..ORDER_SUFFIX_ALPHABET.len())] as char)
        .collect()
}

async fn generate_order_number() -> ApiResult<String> {
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        let suffix = random_suffix(&mut rand::thread_rng());
        let candidate = format_order_number(Utc::now(), &suffix);
        if !repository::exists_number(&candidate).await? {
            return Ok(candidate);
        }
        tracing::warn!("Order number {} already taken, drawing again", candidate);
    }
    Err(anyhow::anyhow!("Could not allocate a unique order number").into())
}

/// Who may look at an order
pub fn can_view(order: &Order, claims: &TokenClaims, seller_stores: &[StoreId]) -> bool {
    claims.is_admin() || order.user_id == claims.sub || order.involves_any_store(seller_stores)
}

/// Places an order from the caller's cart.
///
/// Everything is validated before the first write. Stock is decremented after
/// the order row is stored; a failure there is logged and not rolled back.
pub async fn place(claims: &TokenClaims, dto: PlaceOrderDto) -> ApiResult<Order> {
    let cart = a004_cart::service::get_or_new(&claims.sub).await?;
    if cart.is_empty() {
        return Err(ApiError::Validation("Cart is empty".into()));
    }

    let address_id = Uuid::parse_str(&dto.delivery_address_id)
        .map_err(|_| ApiError::Validation("Delivery address not found".into()))?;
    a007_address::service::get_owned(&claims.sub, address_id)
        .await
        .map_err(|_| ApiError::Validation("Delivery address not found".into()))?;

    let product_ids: Vec<_> = cart.items().iter().map(|line| line.product_id).collect();
    let products = a003_product::repository::get_many(&product_ids).await?;
    let plan = plan_checkout(&cart, &products, &config::get().checkout.policy())?;

    let order_number = generate_order_number().await?;
    let mut order = Order::place(
        claims.sub.clone(),
        order_number,
        &plan,
        address_id.to_string(),
        dto.payment_method,
        dto.notes.filter(|n| !n.trim().is_empty()),
    );
    order.before_write();
    repository::insert(&order).await?;

    apply_stock(&plan.stock_decrements, -1, &order.order_number).await;

    if dto.clear_cart.unwrap_or(true) {
        a004_cart::service::clear_after_checkout(&claims.sub).await?;
    }

    tracing::info!(
        "Order {} placed by {}: {} lines, total {}",
        order.order_number,
        claims.email,
        order.items.len(),
        format_minor_units(order.total)
    );
    Ok(order)
}

async fn apply_stock(changes: &[StockDecrement], sign: i32, order_number: &str) {
    apply_stock_with(get_connection(), changes, sign, order_number).await
}

/// Applies `sign × quantity` to each product stock. Failures are logged and skipped.
async fn apply_stock_with<C: ConnectionTrait>(
    db: &C,
    changes: &[StockDecrement],
    sign: i32,
    order_number: &str,
) {
    for change in changes {
        let delta = sign.saturating_mul(change.quantity);
        if let Err(e) = a003_product::repository::adjust_stock_with(db, change.product_id, delta).await
        {
            tracing::error!(
                "Stock update of product {} for order {} failed: {:#}",
                change.product_id,
                order_number,
                e
            );
        }
    }
}

fn page_query(filter: &OrderFilter) -> PageQuery {
    PageQuery {
        page: filter.page,
        limit: filter.limit,
    }
}

async fn list_scope(scope: OrderScope, filter: OrderFilter) -> ApiResult<Page<Order>> {
    let query = page_query(&filter);
    let (items, total) =
        repository::list(&scope, filter.status, query.page(), query.limit()).await?;
    Ok(Page::new(items, total, &query))
}

pub async fn list_own(claims: &TokenClaims, filter: OrderFilter) -> ApiResult<Page<Order>> {
    list_scope(OrderScope::User(claims.sub.clone()), filter).await
}

/// Orders containing products of the seller's stores; admins see everything
pub async fn list_for_seller(claims: &TokenClaims, filter: OrderFilter) -> ApiResult<Page<Order>> {
    if claims.is_admin() {
        return list_scope(OrderScope::All, filter).await;
    }
    let stores = a002_store::service::store_ids_of_seller(&claims.sub).await?;
    list_scope(OrderScope::Stores(stores), filter).await
}

pub async fn list_all(filter: OrderFilter) -> ApiResult<Page<Order>> {
    list_scope(OrderScope::All, filter).await
}

async fn load(id: Uuid) -> ApiResult<Order> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order"))
}

async fn seller_stores(claims: &TokenClaims) -> ApiResult<Vec<StoreId>> {
    if claims.can_sell() && !claims.is_admin() {
        a002_store::service::store_ids_of_seller(&claims.sub).await
    } else {
        Ok(Vec::new())
    }
}

pub async fn get(claims: &TokenClaims, id: Uuid) -> ApiResult<Order> {
    let order = load(id).await?;
    let stores = seller_stores(claims).await?;
    if can_view(&order, claims, &stores) {
        Ok(order)
    } else {
        Err(ApiError::not_found("Order"))
    }
}

/// Customer cancellation of an own order, or admin cancellation of any order
pub async fn cancel(claims: &TokenClaims, id: Uuid) -> ApiResult<Order> {
    let mut order = load(id).await?;
    let is_owner = order.user_id == claims.sub;
    if !is_owner && !claims.is_admin() {
        return Err(ApiError::not_found("Order"));
    }
    if !claims.is_admin() && !order.status.customer_can_cancel() {
        return Err(ApiError::Validation(format!(
            "Order can no longer be cancelled (status: {})",
            order.status
        )));
    }

    order.transition_to(OrderStatus::Cancelled)?;
    order.before_write();
    repository::update(&order).await?;
    apply_stock(&order.quantities_by_product(), 1, &order.order_number).await;

    tracing::info!("Order {} cancelled by {}", order.order_number, claims.email);
    Ok(order)
}

/// Status change by an involved seller or an admin
pub async fn update_status(claims: &TokenClaims, id: Uuid, next: OrderStatus) -> ApiResult<Order> {
    let mut order = load(id).await?;
    if !claims.is_admin() {
        let stores = seller_stores(claims).await?;
        if !order.involves_any_store(&stores) {
            return Err(ApiError::forbidden());
        }
    }

    let previous = order.status;
    order.transition_to(next)?;
    order.before_write();
    repository::update(&order).await?;
    if next == OrderStatus::Cancelled {
        apply_stock(&order.quantities_by_product(), 1, &order.order_number).await;
    }

    tracing::info!(
        "Order {}: {} -> {} by {}",
        order.order_number,
        previous,
        next,
        claims.email
    );
    Ok(order)
}

pub async fn update_payment_status(id: Uuid, next: PaymentStatus) -> ApiResult<Order> {
    let mut order = load(id).await?;
    order.set_payment_status(next)?;
    order.before_write();
    repository::update(&order).await?;
    tracing::info!("Order {} payment is now {}", order.order_number, next);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::open_in_memory;
    use contracts::domain::a001_category::aggregate::CategoryId;
    use contracts::domain::a003_product::aggregate::{Product, ProductDto, ProductId, ProductVariant};
    use contracts::domain::a004_cart::aggregate::{Cart, CartOffer};
    use contracts::domain::a005_order::aggregate::PaymentMethod;
    use contracts::domain::a005_order::checkout::{is_valid_order_number, CheckoutPolicy};
    use std::collections::HashMap;
    use contracts::system::users::UserRole;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn claims(sub: &str, role: UserRole) -> TokenClaims {
        TokenClaims {
            sub: sub.into(),
            email: format!("{}@example.com", sub),
            role,
            exp: 0,
            iat: 0,
        }
    }

    fn order_from(user_id: &str, store: StoreId) -> Order {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "createdAt": Utc::now(),
            "updatedAt": Utc::now(),
            "isDeleted": false,
            "version": 0,
            "orderNumber": "ORD-20260101-AAAAAA",
            "userId": user_id,
            "items": [{
                "productId": Uuid::new_v4(),
                "variantId": null,
                "storeId": store.value(),
                "name": "Milk",
                "unitPrice": 100,
                "quantity": 2,
                "lineTotal": 200
            }],
            "subtotal": 200,
            "tax": 10,
            "deliveryFee": 0,
            "total": 210,
            "status": "pending",
            "paymentStatus": "pending",
            "paymentMethod": "upi",
            "deliveryAddressId": Uuid::new_v4().to_string(),
            "notes": null
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_random_suffix_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let suffix = random_suffix(&mut rng);
            assert_eq!(suffix.len(), ORDER_SUFFIX_LEN);
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(is_valid_order_number(&format_order_number(Utc::now(), &suffix)));
        }
    }

    #[test]
    fn test_view_access() {
        let store = StoreId::new_v4();
        let order = order_from("buyer", store);

        assert!(can_view(&order, &claims("buyer", UserRole::Customer), &[]));
        assert!(can_view(&order, &claims("root", UserRole::Admin), &[]));
        assert!(can_view(&order, &claims("seller", UserRole::Seller), &[store]));
        assert!(!can_view(
            &order,
            &claims("seller", UserRole::Seller),
            &[StoreId::new_v4()]
        ));
        assert!(!can_view(&order, &claims("other", UserRole::Customer), &[]));
    }

    fn product(name: &str, price: i64, stock: i32) -> Product {
        Product::new_for_insert(&ProductDto {
            store_id: StoreId::new_v4(),
            category_id: CategoryId::new_v4(),
            name: name.into(),
            description: None,
            price,
            compare_at_price: None,
            stock,
            unit: None,
            images: vec![],
            variants: vec![ProductVariant {
                id: "half".into(),
                name: "500 ml".into(),
                price: Some(price / 2),
            }],
            is_active: None,
        })
    }

    async fn stock_of<C: ConnectionTrait>(db: &C, product: &Product) -> i32 {
        a003_product::repository::get_by_id_with(db, product.base.id.value())
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    #[tokio::test]
    async fn test_placing_and_cancelling_moves_stock_by_ordered_quantity() {
        let db = open_in_memory().await.unwrap();
        let milk = product("Milk", 6000, 10);
        let bread = product("Bread", 3500, 4);
        for p in [&milk, &bread] {
            a003_product::repository::insert_with(&db, p).await.unwrap();
        }

        let mut cart = Cart::new("buyer");
        let offer = |p: &Product, variant: Option<&str>| CartOffer::from_product(p, variant).unwrap();
        cart.add_item(&offer(&milk, None), 2).unwrap();
        cart.add_item(&offer(&milk, Some("half")), 3).unwrap();
        cart.add_item(&offer(&bread, None), 4).unwrap();

        let catalog: HashMap<_, _> = [&milk, &bread]
            .into_iter()
            .map(|p| (p.base.id, p.clone()))
            .collect();
        let plan = plan_checkout(&cart, &catalog, &CheckoutPolicy::default()).unwrap();
        let order = Order::place(
            "buyer",
            "ORD-20260101-AAAAAA",
            &plan,
            Uuid::new_v4().to_string(),
            PaymentMethod::Upi,
            None,
        );

        apply_stock_with(&db, &plan.stock_decrements, -1, &order.order_number).await;
        assert_eq!(stock_of(&db, &milk).await, 10 - 5);
        assert_eq!(stock_of(&db, &bread).await, 0);

        apply_stock_with(&db, &order.quantities_by_product(), 1, &order.order_number).await;
        assert_eq!(stock_of(&db, &milk).await, 10);
        assert_eq!(stock_of(&db, &bread).await, 4);
    }

    #[tokio::test]
    async fn test_stock_update_of_missing_product_is_skipped() {
        let db = open_in_memory().await.unwrap();
        let milk = product("Milk", 6000, 10);
        a003_product::repository::insert_with(&db, &milk).await.unwrap();

        let ghost = ProductId::new_v4();
        assert!(a003_product::repository::adjust_stock_with(&db, ghost, -1)
            .await
            .is_err());

        let changes = [
            StockDecrement {
                product_id: ghost,
                quantity: 3,
            },
            StockDecrement {
                product_id: milk.base.id,
                quantity: 3,
            },
        ];
        apply_stock_with(&db, &changes, -1, "ORD-20260101-BBBBBB").await;
        assert_eq!(stock_of(&db, &milk).await, 7);
    }

    #[test]
    fn test_store_ids_column() {
        let store = StoreId::new_v4();
        let order = order_from("buyer", store);
        assert_eq!(
            repository::encode_store_ids(&order),
            format!(",{},", store.value())
        );
    }
}
