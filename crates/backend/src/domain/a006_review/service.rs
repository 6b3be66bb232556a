use super::repository;
use crate::domain::a003_product;
use crate::shared::error::{ApiError, ApiResult};
use crate::system::users;
use contracts::domain::a003_product::aggregate::ProductId;
use contracts::domain::a006_review::aggregate::{Review, ReviewDto};
use contracts::system::auth::TokenClaims;
use uuid::Uuid;

/// Strips everything but inline formatting from user supplied review text
pub fn sanitize_text(text: &str) -> String {
    ammonia::Builder::new()
        .tags(maplit::hashset!["b", "i", "em", "strong", "br", "p"])
        .clean(text)
        .to_string()
}

/// One review per product and user
pub fn ensure_not_reviewed(existing: Option<&Review>) -> ApiResult<()> {
    match existing {
        Some(_) => Err(ApiError::Conflict(
            "You have already reviewed this product".into(),
        )),
        None => Ok(()),
    }
}

pub async fn list_for_product(product_id: Uuid) -> ApiResult<Vec<Review>> {
    let product = a003_product::service::get_public(product_id).await?;
    Ok(repository::list_by_product(product.base.id).await?)
}

pub async fn create(claims: &TokenClaims, product_id: Uuid, dto: ReviewDto) -> ApiResult<Review> {
    let product = a003_product::service::get_public(product_id).await?;
    let existing = repository::find_by_product_and_user(product.base.id, &claims.sub).await?;
    ensure_not_reviewed(existing.as_ref())?;

    let author = users::service::get_by_id(&claims.sub).await?;
    let mut aggregate = Review::new_for_insert(product.base.id, claims.sub.clone(), author.name, &dto);
    aggregate.title = aggregate.title.as_deref().map(sanitize_text);
    aggregate.comment = aggregate.comment.as_deref().map(sanitize_text);
    aggregate.validate().map_err(ApiError::Validation)?;

    aggregate.before_write();
    repository::insert(&aggregate).await?;
    refresh_product_rating(product.base.id).await?;

    tracing::info!(
        "Review {}/5 on '{}' by {}",
        aggregate.rating,
        product.name,
        claims.email
    );
    Ok(aggregate)
}

pub async fn delete(claims: &TokenClaims, id: Uuid) -> ApiResult<()> {
    let review = repository::get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review"))?;
    if !review.can_be_deleted_by(&claims.sub, claims.is_admin()) {
        return Err(ApiError::Forbidden(
            "Only the author or an admin can delete a review".into(),
        ));
    }

    repository::delete(id).await?;
    refresh_product_rating(review.product_id).await?;
    Ok(())
}

async fn refresh_product_rating(product_id: ProductId) -> ApiResult<()> {
    let ratings = repository::ratings_for(product_id).await?;
    a003_product::service::recompute_rating(product_id, &ratings).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_scripts_and_keeps_formatting() {
        assert_eq!(sanitize_text("<script>alert(1)</script>Great"), "Great");
        assert_eq!(sanitize_text("<b>Fresh</b> milk"), "<b>Fresh</b> milk");
        assert_eq!(
            sanitize_text(r#"<a href="javascript:x()">link</a>"#),
            "link"
        );
    }

    #[test]
    fn test_duplicate_review_is_a_conflict() {
        assert!(ensure_not_reviewed(None).is_ok());

        let review = Review::new_for_insert(
            ProductId::new_v4(),
            "u1".into(),
            "Ann".into(),
            &ReviewDto {
                rating: 4,
                title: None,
                comment: None,
            },
        );
        let err = ensure_not_reviewed(Some(&review)).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }
}
