use super::repository;
use crate::shared::error::{ApiError, ApiResult};
use contracts::domain::a007_address::aggregate::{Address, AddressDto};
use uuid::Uuid;

/// Addresses of another user answer 404, not 403
pub async fn get_owned(user_id: &str, id: Uuid) -> ApiResult<Address> {
    repository::get_by_id(id)
        .await?
        .filter(|a| a.is_owned_by(user_id))
        .ok_or_else(|| ApiError::not_found("Address"))
}

pub async fn list(user_id: &str) -> ApiResult<Vec<Address>> {
    Ok(repository::list_by_user(user_id).await?)
}

pub async fn create(user_id: &str, dto: AddressDto) -> ApiResult<Address> {
    let mut aggregate = Address::new_for_insert(user_id.to_string(), &dto);
    aggregate.validate().map_err(ApiError::Validation)?;

    let existing = repository::list_by_user(user_id).await?;
    if existing.is_empty() {
        aggregate.is_default = true;
    }

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    if aggregate.is_default && !existing.is_empty() {
        repository::clear_default(user_id, aggregate.base.id.value()).await?;
    }
    Ok(aggregate)
}

pub async fn update(user_id: &str, id: Uuid, dto: AddressDto) -> ApiResult<Address> {
    let mut aggregate = get_owned(user_id, id).await?;
    let was_default = aggregate.is_default;
    aggregate.update(&dto);
    // the only way to drop the default is to pick another one
    if was_default {
        aggregate.is_default = true;
    }
    aggregate.validate().map_err(ApiError::Validation)?;

    aggregate.before_write();
    repository::update(&aggregate).await?;
    if aggregate.is_default && !was_default {
        repository::clear_default(user_id, id).await?;
    }
    Ok(aggregate)
}

/// Deleting the default address promotes the oldest remaining one
pub async fn delete(user_id: &str, id: Uuid) -> ApiResult<()> {
    let aggregate = get_owned(user_id, id).await?;
    repository::soft_delete(id).await?;

    if aggregate.is_default {
        if let Some(mut next) = repository::list_by_user(user_id).await?.into_iter().next() {
            next.is_default = true;
            next.before_write();
            repository::update(&next).await?;
        }
    }
    Ok(())
}
