use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogRepository, Paging, ReviewRepository};
use crate::domain::review::{Review, ReviewInput, ReviewStats};

pub struct ReviewService<R, K> {
    repo: R,
    catalog: K,
}

impl<R: ReviewRepository, K: CatalogRepository> ReviewService<R, K> {
    pub fn new(repo: R, catalog: K) -> Self {
        Self { repo, catalog }
    }

    pub fn product_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.repo.approved_reviews(product_id)
    }

    pub fn stats(&self, product_id: Uuid) -> Result<ReviewStats, DomainError> {
        Ok(ReviewStats::of(&self.repo.approved_ratings(product_id)?))
    }

    /// New reviews wait for moderation. A delivered order containing the
    /// product marks the review as a verified purchase.
    pub fn create(&self, product_id: Uuid, customer_id: Uuid, input: ReviewInput) -> Result<Review, DomainError> {
        let input = input.validate()?;
        self.catalog
            .product_by_id(product_id)?
            .filter(|p| p.is_active)
            .ok_or(DomainError::NotFound("Product"))?;
        let verified = self.repo.has_delivered_purchase(customer_id, product_id)?;
        self.repo.create_review(product_id, customer_id, &input, verified)
    }

    pub fn update(&self, id: Uuid, customer_id: Uuid, input: ReviewInput) -> Result<Review, DomainError> {
        let input = input.validate()?;
        self.owned(id, customer_id)?;
        self.repo.update_review(id, &input)
    }

    pub fn delete(&self, id: Uuid, customer_id: Uuid) -> Result<(), DomainError> {
        self.owned(id, customer_id)?;
        self.repo.delete_review(id)?;
        Ok(())
    }

    fn owned(&self, id: Uuid, customer_id: Uuid) -> Result<Review, DomainError> {
        let review = self.repo.review(id)?.ok_or(DomainError::NotFound("Review"))?;
        if review.customer_id != customer_id {
            return Err(DomainError::Forbidden("You can only modify your own reviews".into()));
        }
        Ok(review)
    }

    // ── Moderation ───────────────────────────────────────────────────────────

    pub fn list(&self, approved: Option<bool>, paging: Paging) -> Result<(Vec<Review>, i64), DomainError> {
        self.repo.reviews(approved, paging)
    }

    pub fn approve(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.approve_review(id)? {
            return Err(DomainError::NotFound("Review"));
        }
        Ok(())
    }

    pub fn reject(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_review(id)? {
            return Err(DomainError::NotFound("Review"));
        }
        Ok(())
    }
}
