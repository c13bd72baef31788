use chrono::Utc;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::domain::ports::{Paging, ReviewRepository};
use crate::domain::review::{Review, ReviewInput};
use crate::schema::{order_items, orders, product_reviews};

use super::conflict_as;
use super::models::{NewReviewRow, ReviewChanges, ReviewRow};

pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ReviewRepository for DieselReviewRepository {
    fn approved_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = product_reviews::table
            .filter(product_reviews::product_id.eq(product_id))
            .filter(product_reviews::is_approved.eq(true))
            .select(ReviewRow::as_select())
            .order(product_reviews::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    fn approved_ratings(&self, product_id: Uuid) -> Result<Vec<i32>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(product_reviews::table
            .filter(product_reviews::product_id.eq(product_id))
            .filter(product_reviews::is_approved.eq(true))
            .select(product_reviews::rating)
            .load(&mut conn)?)
    }

    fn review(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = product_reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Review::from))
    }

    fn has_delivered_purchase(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let delivered = order_items::table
            .inner_join(orders::table)
            .filter(orders::customer_id.eq(customer_id))
            .filter(orders::status.eq(OrderStatus::Delivered.as_str()))
            .filter(order_items::product_id.eq(product_id));
        Ok(diesel::select(exists(delivered)).get_result(&mut conn)?)
    }

    fn create_review(
        &self,
        product_id: Uuid,
        customer_id: Uuid,
        input: &ReviewInput,
        verified: bool,
    ) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(product_reviews::table)
            .values(&NewReviewRow {
                id: Uuid::new_v4(),
                product_id,
                customer_id,
                rating: input.rating,
                title: input.title.clone(),
                content: input.content.clone(),
                is_verified_purchase: verified,
            })
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .map_err(conflict_as("You have already reviewed this product"))?;
        Ok(row.into())
    }

    fn update_review(&self, id: Uuid, input: &ReviewInput) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(product_reviews::table.find(id))
            .set(&ReviewChanges::new(input, Utc::now()))
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Review::from)
            .ok_or(DomainError::NotFound("Review"))
    }

    fn delete_review(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(product_reviews::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn reviews(&self, approved: Option<bool>, paging: Paging) -> Result<(Vec<Review>, i64), DomainError> {
        let mut conn = self.pool.get()?;

        let filtered = || {
            let mut query = product_reviews::table.into_boxed::<Pg>();
            if let Some(approved) = approved {
                query = query.filter(product_reviews::is_approved.eq(approved));
            }
            query
        };

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered().count().get_result(conn)?;
            let rows = filtered()
                .select(ReviewRow::as_select())
                .order(product_reviews::created_at.desc())
                .limit(paging.limit)
                .offset(paging.offset())
                .load(conn)?;
            Ok((rows.into_iter().map(Review::from).collect(), total))
        })
    }

    fn approve_review(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(product_reviews::table.find(id))
            .set((
                product_reviews::is_approved.eq(true),
                product_reviews::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }
}
