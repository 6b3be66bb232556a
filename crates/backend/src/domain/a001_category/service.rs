use super::repository;
use crate::shared::error::{ApiError, ApiResult};
use contracts::domain::a001_category::aggregate::{Category, CategoryDto};
use uuid::Uuid;

pub async fn create(dto: CategoryDto) -> ApiResult<Category> {
    let mut aggregate = Category::new_for_insert(&dto);
    aggregate.validate().map_err(ApiError::Validation)?;
    ensure_slug_free(&aggregate.slug, None).await?;

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    tracing::info!("Category '{}' created", aggregate.slug);
    Ok(aggregate)
}

pub async fn update(id: Uuid, dto: CategoryDto) -> ApiResult<Category> {
    let mut aggregate = get_by_id(id).await?;
    aggregate.update(&dto);
    aggregate.validate().map_err(ApiError::Validation)?;
    ensure_slug_free(&aggregate.slug, Some(id)).await?;

    aggregate.before_write();
    repository::update(&aggregate).await?;
    Ok(aggregate)
}

async fn ensure_slug_free(slug: &str, own_id: Option<Uuid>) -> ApiResult<()> {
    match repository::get_by_slug(slug).await? {
        Some(existing) if Some(existing.base.id.value()) != own_id => Err(ApiError::Conflict(
            format!("Category slug '{}' is already used", slug),
        )),
        _ => Ok(()),
    }
}

pub async fn delete(id: Uuid) -> ApiResult<()> {
    if repository::soft_delete(id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("Category"))
    }
}

pub async fn get_by_id(id: Uuid) -> ApiResult<Category> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))
}

/// Resolves a category reference given either as id or as slug
pub async fn resolve(reference: &str) -> ApiResult<Option<Category>> {
    match Uuid::parse_str(reference) {
        Ok(id) => Ok(repository::get_by_id(id).await?),
        Err(_) => Ok(repository::get_by_slug(reference).await?),
    }
}

pub async fn list(active_only: bool) -> ApiResult<Vec<Category>> {
    Ok(repository::list(active_only).await?)
}
