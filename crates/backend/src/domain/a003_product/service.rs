use super::repository::{self, ProductQuery};
use crate::domain::{a001_category, a002_store};
use crate::shared::error::{ApiError, ApiResult};
use contracts::domain::a003_product::aggregate::{Product, ProductDto, ProductFilter, ProductId};
use contracts::shared::pagination::{Page, PageQuery};
use contracts::system::auth::TokenClaims;
use uuid::Uuid;

/// Public catalog listing. An unknown category or store yields an empty page.
pub async fn list(filter: ProductFilter) -> ApiResult<Page<Product>> {
    let page_query = PageQuery {
        page: filter.page,
        limit: filter.limit,
    };
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(ApiError::Validation(
                "minPrice cannot be greater than maxPrice".into(),
            ));
        }
    }

    let category_id = match filter.category.as_deref().filter(|c| !c.is_empty()) {
        Some(reference) => match a001_category::service::resolve(reference).await? {
            Some(category) => Some(category.base.id.value()),
            None => return Ok(Page::new(Vec::new(), 0, &page_query)),
        },
        None => None,
    };
    let store_id = match filter.store.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return Ok(Page::new(Vec::new(), 0, &page_query)),
        },
        None => None,
    };

    let query = ProductQuery {
        category_id,
        store_id,
        search: filter.search,
        min_price: filter.min_price,
        max_price: filter.max_price,
        in_stock: filter.in_stock.unwrap_or(false),
        page: page_query.page(),
        limit: page_query.limit(),
    };
    let (items, total) = repository::list_filtered(&query).await?;
    Ok(Page::new(items, total, &page_query))
}

/// Any stored product, deleted ones answer 404
pub async fn get_by_id(id: Uuid) -> ApiResult<Product> {
    repository::get_by_id(id)
        .await?
        .filter(|p| !p.base.metadata.is_deleted)
        .ok_or_else(|| ApiError::not_found("Product"))
}

/// Public view: inactive products are hidden
pub async fn get_public(id: Uuid) -> ApiResult<Product> {
    let product = get_by_id(id).await?;
    if product.is_available() {
        Ok(product)
    } else {
        Err(ApiError::not_found("Product"))
    }
}

/// Product must point at an active store the caller manages and an active category
async fn check_references(claims: &TokenClaims, product: &Product) -> ApiResult<()> {
    let store = a002_store::service::get_by_id(product.store_id.value())
        .await
        .map_err(|_| ApiError::Validation("Store does not exist".into()))?;
    a002_store::service::ensure_manages(&store, claims)?;
    if !store.is_active {
        return Err(ApiError::Validation(format!(
            "Store '{}' is not active",
            store.name
        )));
    }

    let category = a001_category::service::get_by_id(product.category_id.value())
        .await
        .map_err(|_| ApiError::Validation("Category does not exist".into()))?;
    if !category.is_active {
        return Err(ApiError::Validation(format!(
            "Category '{}' is not active",
            category.name
        )));
    }
    Ok(())
}

pub async fn create(claims: &TokenClaims, dto: ProductDto) -> ApiResult<Product> {
    let mut aggregate = Product::new_for_insert(&dto);
    aggregate.validate().map_err(ApiError::Validation)?;
    check_references(claims, &aggregate).await?;

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    tracing::info!("Product '{}' created by {}", aggregate.name, claims.email);
    Ok(aggregate)
}

pub async fn update(claims: &TokenClaims, id: Uuid, dto: ProductDto) -> ApiResult<Product> {
    let mut aggregate = get_by_id(id).await?;
    // the current store must be managed too, not only the target one
    let current_store = a002_store::service::get_by_id(aggregate.store_id.value()).await?;
    a002_store::service::ensure_manages(&current_store, claims)?;

    aggregate.update(&dto);
    aggregate.validate().map_err(ApiError::Validation)?;
    check_references(claims, &aggregate).await?;

    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(aggregate)
}

pub async fn delete(claims: &TokenClaims, id: Uuid) -> ApiResult<()> {
    let aggregate = get_by_id(id).await?;
    let store = a002_store::service::get_by_id(aggregate.store_id.value()).await?;
    a002_store::service::ensure_manages(&store, claims)?;

    repository::soft_delete(id).await?;
    tracing::info!("Product '{}' deleted by {}", aggregate.name, claims.email);
    Ok(())
}

/// Products a seller manages; admins see the whole catalog
pub async fn list_for_seller(claims: &TokenClaims) -> ApiResult<Vec<Product>> {
    if claims.is_admin() {
        return Ok(repository::list_all().await?);
    }
    let store_ids = a002_store::service::store_ids_of_seller(&claims.sub).await?;
    Ok(repository::list_by_stores(&store_ids).await?)
}

/// Recomputes `rating` and `reviewCount` from the stored reviews
pub async fn recompute_rating(product_id: ProductId, ratings: &[i32]) -> ApiResult<()> {
    let Some(mut product) = repository::get_by_id(product_id.value()).await? else {
        return Err(ApiError::not_found("Product"));
    };
    product.apply_ratings(ratings);
    repository::update_rating(product_id, product.rating, product.review_count).await?;
    Ok(())
}
