use serde::{Deserialize, Serialize};

use crate::domain::a003_product::aggregate::ProductId;
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

crate::uuid_id!(
    /// Review identifier
    ReviewId
);

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const MAX_COMMENT_LEN: usize = 2000;

/// Customer review. A user reviews a given product at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(flatten)]
    pub base: BaseAggregate<ReviewId>,

    pub product_id: ProductId,
    pub user_id: String,
    /// Author display name at the time of writing
    pub user_name: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl Review {
    pub fn new_for_insert(
        product_id: ProductId,
        user_id: String,
        user_name: String,
        dto: &ReviewDto,
    ) -> Self {
        Self {
            base: BaseAggregate::new(ReviewId::new_v4()),
            product_id,
            user_id,
            user_name,
            rating: dto.rating,
            title: dto.title.as_deref().map(str::trim).map(str::to_string),
            comment: dto.comment.as_deref().map(str::trim).map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ));
        }
        if let Some(comment) = &self.comment {
            if comment.chars().count() > MAX_COMMENT_LEN {
                return Err(format!(
                    "Comment must be at most {} characters",
                    MAX_COMMENT_LEN
                ));
            }
        }
        Ok(())
    }

    /// Author or admin
    pub fn can_be_deleted_by(&self, user_id: &str, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Review {
    type Id = ReviewId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a006"
    }

    fn collection_name() -> &'static str {
        "review"
    }

    fn element_name() -> &'static str {
        "Review"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32, comment: Option<String>) -> Review {
        Review::new_for_insert(
            ProductId::new_v4(),
            "u1".into(),
            "Asha".into(),
            &ReviewDto {
                rating,
                title: None,
                comment,
            },
        )
    }

    #[test]
    fn test_rating_bounds() {
        assert!(review(0, None).validate().is_err());
        assert!(review(1, None).validate().is_ok());
        assert!(review(5, None).validate().is_ok());
        assert!(review(6, None).validate().is_err());
    }

    #[test]
    fn test_comment_length() {
        let long = "x".repeat(MAX_COMMENT_LEN + 1);
        assert!(review(4, Some(long)).validate().is_err());
        assert!(review(4, Some("  fresh and cold  ".into())).validate().is_ok());
        assert_eq!(
            review(4, Some("  fresh  ".into())).comment.as_deref(),
            Some("fresh")
        );
    }

    #[test]
    fn test_delete_rights() {
        let r = review(3, None);
        assert!(r.can_be_deleted_by("u1", false));
        assert!(!r.can_be_deleted_by("u2", false));
        assert!(r.can_be_deleted_by("u2", true));
    }
}
