use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::discount::{CouponSource, Discount, DiscountInput};
use crate::domain::errors::DomainError;
use crate::domain::newsletter::{Subscriber, Subscription};
use crate::domain::order::OrderStatus;
use crate::domain::ports::{DiscountRepository, NewsletterRepository, Paging};
use crate::schema::{discounts, newsletter_subscribers, orders};

use super::conflict_as;
use super::models::{DiscountRow, DiscountValues, NewSubscriberRow, SubscriberRow};

const DUPLICATE_CODE: &str = "Discount code already exists";

/// Merchant discounts and newsletter coupons.
pub struct DieselDiscountRepository {
    pool: DbPool,
}

impl DieselDiscountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Resolves `code` to its coupon. With `lock` the matching row stays locked
/// until the surrounding transaction ends, so two checkouts cannot both
/// redeem the last use.
pub(crate) fn coupon_by_code(
    conn: &mut PgConnection,
    code: &str,
    lock: bool,
) -> Result<Option<CouponSource>, DomainError> {
    let merchant = discounts::table
        .filter(discounts::code.eq(code))
        .select(DiscountRow::as_select());
    let merchant = if lock {
        merchant.for_update().first(conn).optional()?
    } else {
        merchant.first(conn).optional()?
    };
    if let Some(row) = merchant {
        return Ok(Some(CouponSource::Merchant(Discount::try_from(row)?)));
    }

    let subscriber = newsletter_subscribers::table
        .filter(newsletter_subscribers::discount_code.eq(code))
        .select(SubscriberRow::as_select());
    let subscriber = if lock {
        subscriber.for_update().first(conn).optional()?
    } else {
        subscriber.first(conn).optional()?
    };
    Ok(subscriber
        .map(Subscriber::from)
        .and_then(|s| s.coupon())
        .map(CouponSource::Newsletter))
}

/// Non-cancelled orders of `customer_id` that carried `discount_id`.
pub(crate) fn count_customer_uses(
    conn: &mut PgConnection,
    discount_id: Uuid,
    customer_id: Uuid,
) -> QueryResult<i64> {
    orders::table
        .filter(orders::discount_id.eq(discount_id))
        .filter(orders::customer_id.eq(customer_id))
        .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
        .count()
        .get_result(conn)
}

impl DiscountRepository for DieselDiscountRepository {
    fn find_coupon(&self, code: &str) -> Result<Option<CouponSource>, DomainError> {
        let mut conn = self.pool.get()?;
        coupon_by_code(&mut conn, code, false)
    }

    fn customer_uses(&self, discount_id: Uuid, customer_id: Uuid) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(count_customer_uses(&mut conn, discount_id, customer_id)?)
    }

    fn discounts(&self) -> Result<Vec<Discount>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = discounts::table
            .select(DiscountRow::as_select())
            .order(discounts::created_at.desc())
            .load(&mut conn)?;
        rows.into_iter().map(Discount::try_from).collect()
    }

    fn create_discount(&self, input: DiscountInput) -> Result<Discount, DomainError> {
        let mut conn = self.pool.get()?;
        let values = DiscountValues::from_input(input, Utc::now());
        let row = diesel::insert_into(discounts::table)
            .values((discounts::id.eq(Uuid::new_v4()), &values))
            .returning(DiscountRow::as_returning())
            .get_result(&mut conn)
            .map_err(conflict_as(DUPLICATE_CODE))?;
        Discount::try_from(row)
    }

    fn update_discount(&self, id: Uuid, input: DiscountInput) -> Result<Option<Discount>, DomainError> {
        let mut conn = self.pool.get()?;
        let values = DiscountValues::from_input(input, Utc::now());
        diesel::update(discounts::table.find(id))
            .set(&values)
            .returning(DiscountRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(conflict_as(DUPLICATE_CODE))?
            .map(Discount::try_from)
            .transpose()
    }

    fn delete_discount(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(discounts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

impl NewsletterRepository for DieselDiscountRepository {
    fn subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = newsletter_subscribers::table
            .filter(newsletter_subscribers::email.eq(email))
            .select(SubscriberRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Subscriber::from))
    }

    fn insert_subscriber(&self, subscription: &Subscription) -> Result<Subscriber, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(newsletter_subscribers::table)
            .values(&NewSubscriberRow {
                id: Uuid::new_v4(),
                email: subscription.email.clone(),
                language: subscription.language.clone(),
                discount_code: Some(subscription.discount_code.clone()),
                discount_expires_at: Some(subscription.expires_at),
                discount_used: false,
                gdpr_consent: true,
                gdpr_consent_at: Some(subscription.consented_at),
                is_active: true,
                subscribed_at: subscription.consented_at,
            })
            .returning(SubscriberRow::as_returning())
            .get_result(&mut conn)
            .map_err(conflict_as("Email is already subscribed"))?;
        Ok(row.into())
    }

    fn reactivate_subscriber(&self, id: Uuid, subscription: &Subscription) -> Result<Subscriber, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(newsletter_subscribers::table.find(id))
            .set((
                newsletter_subscribers::language.eq(&subscription.language),
                newsletter_subscribers::discount_code.eq(&subscription.discount_code),
                newsletter_subscribers::discount_expires_at.eq(subscription.expires_at),
                newsletter_subscribers::discount_used.eq(false),
                newsletter_subscribers::gdpr_consent.eq(true),
                newsletter_subscribers::gdpr_consent_at.eq(subscription.consented_at),
                newsletter_subscribers::is_active.eq(true),
                newsletter_subscribers::subscribed_at.eq(subscription.consented_at),
                newsletter_subscribers::unsubscribed_at.eq(None::<DateTime<Utc>>),
            ))
            .returning(SubscriberRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        row.map(Subscriber::from).ok_or(DomainError::NotFound("Subscriber"))
    }

    fn unsubscribe(&self, email: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(newsletter_subscribers::table.filter(newsletter_subscribers::email.eq(email)))
            .set((
                newsletter_subscribers::is_active.eq(false),
                newsletter_subscribers::unsubscribed_at.eq(now),
            ))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn subscribers(&self, paging: Paging) -> Result<(Vec<Subscriber>, i64), DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = newsletter_subscribers::table.count().get_result(conn)?;
            let rows = newsletter_subscribers::table
                .select(SubscriberRow::as_select())
                .order(newsletter_subscribers::subscribed_at.desc())
                .limit(paging.limit)
                .offset(paging.offset())
                .load(conn)?;
            Ok((rows.into_iter().map(Subscriber::from).collect(), total))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::domain::discount::DiscountKind;
    use crate::infrastructure::test_support::setup_db;

    fn input(code: &str) -> DiscountInput {
        serde_json::from_value::<DiscountInput>(json!({
            "code": code,
            "discount_type": "percentage",
            "value": "10"
        }))
        .expect("valid input")
        .validate()
        .expect("valid discount")
    }

    fn subscription(email: &str, code: &str) -> Subscription {
        let now = Utc::now();
        Subscription {
            email: email.into(),
            language: "sk".into(),
            discount_code: code.into(),
            expires_at: now + Duration::days(30),
            consented_at: now,
        }
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn merchant_codes_win_over_newsletter_codes() {
        let (_container, pool) = setup_db().await;
        let repo = DieselDiscountRepository::new(pool);

        repo.create_discount(input("WELCOME10")).expect("created");
        repo.insert_subscriber(&subscription("a@example.com", "NEWS-ABC"))
            .expect("subscribed");

        match repo.find_coupon("WELCOME10").expect("lookup") {
            Some(CouponSource::Merchant(d)) => assert_eq!(d.discount_type, DiscountKind::Percentage),
            other => panic!("expected merchant discount, got {other:?}"),
        }
        assert!(matches!(
            repo.find_coupon("NEWS-ABC").expect("lookup"),
            Some(CouponSource::Newsletter(_))
        ));
        assert!(repo.find_coupon("NOPE").expect("lookup").is_none());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn duplicate_code_is_a_conflict() {
        let (_container, pool) = setup_db().await;
        let repo = DieselDiscountRepository::new(pool);

        repo.create_discount(input("SUMMER")).expect("created");
        let err = repo.create_discount(input("SUMMER")).expect_err("duplicate");
        assert!(matches!(err, DomainError::Conflict(msg) if msg == DUPLICATE_CODE));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn reactivation_issues_a_fresh_coupon() {
        let (_container, pool) = setup_db().await;
        let repo = DieselDiscountRepository::new(pool);

        let first = repo
            .insert_subscriber(&subscription("b@example.com", "NEWS-111"))
            .expect("subscribed");
        assert!(repo.unsubscribe("b@example.com", Utc::now()).expect("unsubscribed"));
        let gone = repo
            .subscriber_by_email("b@example.com")
            .expect("lookup")
            .expect("still stored");
        assert!(!gone.is_active);

        let back = repo
            .reactivate_subscriber(first.id, &subscription("b@example.com", "NEWS-222"))
            .expect("reactivated");
        assert!(back.is_active);
        assert!(back.unsubscribed_at.is_none());
        assert_eq!(back.discount_code.as_deref(), Some("NEWS-222"));

        let (all, total) = repo.subscribers(Paging::default()).expect("listed");
        assert_eq!(total, 1);
        assert_eq!(all.len(), 1);
    }
}
