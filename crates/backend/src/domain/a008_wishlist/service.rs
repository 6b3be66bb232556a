use super::repository;
use crate::domain::a003_product;
use crate::shared::error::ApiResult;
use contracts::domain::a003_product::aggregate::ProductId;
use contracts::domain::a008_wishlist::aggregate::{Wishlist, WishlistView};
use uuid::Uuid;

async fn load(user_id: &str) -> ApiResult<Wishlist> {
    Ok(repository::get_by_user(user_id)
        .await?
        .unwrap_or_else(|| Wishlist::new(user_id)))
}

/// Products that were withdrawn since being saved are left out of `products`
async fn view(wishlist: Wishlist) -> ApiResult<WishlistView> {
    let found = a003_product::repository::get_many(&wishlist.product_ids).await?;
    let products = wishlist
        .product_ids
        .iter()
        .filter_map(|id| found.get(id))
        .filter(|p| p.is_available())
        .cloned()
        .collect();
    Ok(WishlistView {
        product_ids: wishlist.product_ids,
        products,
    })
}

pub async fn get(user_id: &str) -> ApiResult<WishlistView> {
    view(load(user_id).await?).await
}

pub async fn add(user_id: &str, product_id: Uuid) -> ApiResult<WishlistView> {
    let product = a003_product::service::get_public(product_id).await?;
    let mut wishlist = load(user_id).await?;
    if wishlist.add(product.base.id) {
        wishlist.before_write();
        repository::save(&wishlist).await?;
    }
    view(wishlist).await
}

/// Removing a product that is not saved is a no-op
pub async fn remove(user_id: &str, product_id: Uuid) -> ApiResult<WishlistView> {
    let mut wishlist = load(user_id).await?;
    if wishlist.remove(ProductId::new(product_id)) {
        wishlist.before_write();
        repository::save(&wishlist).await?;
    }
    view(wishlist).await
}
