use super::repository;
use crate::domain::a003_product;
use crate::shared::error::ApiResult;
use contracts::domain::a003_product::aggregate::ProductId;
use contracts::domain::a004_cart::aggregate::{Cart, CartItemDto, CartOffer};
use uuid::Uuid;

/// Stored cart of the user, or a fresh empty one (not persisted until mutated)
pub async fn get_or_new(user_id: &str) -> ApiResult<Cart> {
    Ok(repository::get_by_user(user_id)
        .await?
        .unwrap_or_else(|| Cart::new(user_id)))
}

/// Current offer for a product, with the catalog state at this moment
async fn offer_for(product_id: ProductId, variant_id: Option<&str>) -> ApiResult<CartOffer> {
    let product = a003_product::service::get_by_id(product_id.value()).await?;
    Ok(CartOffer::from_product(&product, variant_id)?)
}

async fn persist(mut cart: Cart) -> ApiResult<Cart> {
    cart.before_write();
    repository::save(&cart).await?;
    Ok(cart)
}

pub async fn add_item(user_id: &str, dto: CartItemDto) -> ApiResult<Cart> {
    let mut cart = get_or_new(user_id).await?;
    let offer = offer_for(dto.product_id, dto.variant_id.as_deref()).await?;
    cart.add_item(&offer, dto.quantity)?;
    persist(cart).await
}

pub async fn update_item(user_id: &str, dto: CartItemDto) -> ApiResult<Cart> {
    let mut cart = get_or_new(user_id).await?;
    if dto.quantity <= 0 {
        // removal must work even when the product has since been withdrawn
        cart.remove_item(dto.product_id, dto.variant_id.as_deref())?;
    } else {
        let offer = offer_for(dto.product_id, dto.variant_id.as_deref()).await?;
        cart.update_quantity(&offer, dto.quantity)?;
    }
    persist(cart).await
}

pub async fn remove_item(user_id: &str, product_id: Uuid, variant_id: Option<&str>) -> ApiResult<Cart> {
    let mut cart = get_or_new(user_id).await?;
    cart.remove_item(ProductId::new(product_id), variant_id)?;
    persist(cart).await
}

pub async fn clear(user_id: &str) -> ApiResult<Cart> {
    let mut cart = get_or_new(user_id).await?;
    if cart.is_empty() {
        return Ok(cart);
    }
    cart.clear();
    persist(cart).await
}

/// Empties the cart after checkout; a missing cart is not an error
pub async fn clear_after_checkout(user_id: &str) -> ApiResult<()> {
    if let Some(mut cart) = repository::get_by_user(user_id).await? {
        cart.clear();
        persist(cart).await?;
    }
    Ok(())
}

