use super::repository;
use crate::shared::error::{ApiError, ApiResult};
use contracts::domain::a002_store::aggregate::{Store, StoreDto, StoreId};
use contracts::system::auth::TokenClaims;
use uuid::Uuid;

/// Owner seller or admin
pub fn ensure_manages(store: &Store, claims: &TokenClaims) -> ApiResult<()> {
    if store.is_managed_by(&claims.sub, claims.is_admin()) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Store '{}' belongs to another seller",
            store.name
        )))
    }
}

pub async fn create(claims: &TokenClaims, dto: StoreDto) -> ApiResult<Store> {
    let mut aggregate = Store::new_for_insert(claims.sub.clone(), &dto);
    aggregate.validate().map_err(ApiError::Validation)?;

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    tracing::info!("Store '{}' created by {}", aggregate.name, claims.email);
    Ok(aggregate)
}

pub async fn update(claims: &TokenClaims, id: Uuid, dto: StoreDto) -> ApiResult<Store> {
    let mut aggregate = get_by_id(id).await?;
    ensure_manages(&aggregate, claims)?;

    aggregate.update(&dto);
    aggregate.validate().map_err(ApiError::Validation)?;

    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(aggregate)
}

pub async fn delete(claims: &TokenClaims, id: Uuid) -> ApiResult<()> {
    let aggregate = get_by_id(id).await?;
    ensure_manages(&aggregate, claims)?;
    repository::soft_delete(id).await?;
    tracing::info!("Store '{}' deleted by {}", aggregate.name, claims.email);
    Ok(())
}

pub async fn get_by_id(id: Uuid) -> ApiResult<Store> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store"))
}

/// Public view: inactive stores are hidden
pub async fn get_public(id: Uuid) -> ApiResult<Store> {
    let store = get_by_id(id).await?;
    if store.is_active {
        Ok(store)
    } else {
        Err(ApiError::not_found("Store"))
    }
}

pub async fn list_active() -> ApiResult<Vec<Store>> {
    Ok(repository::list_active().await?)
}

pub async fn list_by_seller(seller_id: &str) -> ApiResult<Vec<Store>> {
    Ok(repository::list_by_seller(seller_id).await?)
}

pub async fn store_ids_of_seller(seller_id: &str) -> ApiResult<Vec<StoreId>> {
    Ok(repository::list_by_seller(seller_id)
        .await?
        .into_iter()
        .map(|s| s.base.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::users::UserRole;

    fn claims(sub: &str, role: UserRole) -> TokenClaims {
        TokenClaims {
            sub: sub.into(),
            email: format!("{}@example.com", sub),
            role,
            exp: 0,
            iat: 0,
        }
    }

    fn store() -> Store {
        Store::new_for_insert(
            "seller-1".into(),
            &StoreDto {
                name: "Corner Fresh".into(),
                description: None,
                address: "12 Market St".into(),
                phone: None,
                logo_url: None,
                is_active: None,
            },
        )
    }

    #[test]
    fn test_only_owner_or_admin_manage() {
        let store = store();
        assert!(ensure_manages(&store, &claims("seller-1", UserRole::Seller)).is_ok());
        assert!(ensure_manages(&store, &claims("admin", UserRole::Admin)).is_ok());
        let err = ensure_manages(&store, &claims("seller-2", UserRole::Seller)).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
