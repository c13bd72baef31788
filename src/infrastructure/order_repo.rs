use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::discount::{normalize_code, AppliedDiscount, CouponSource, Redemption};
use crate::domain::errors::{DiscountRejection, DomainError};
use crate::domain::order::{
    format_order_number, CheckoutDraft, Order, OrderEvent, OrderFilter, OrderItem, OrderPage, OrderRef,
    PaymentStatus, PlacedOrder, StatusChange,
};
use crate::domain::ports::{OrderRepository, Paging};
use crate::schema::{carts, customers, discounts, newsletter_subscribers, order_items, order_outbox, orders, products};

use super::discount_repo::{count_customer_uses, coupon_by_code};
use super::models::{NewCustomerRow, NewOrderItemRow, NewOrderRow, NewOutboxEventRow, OrderItemRow, OrderRow};

#[derive(QueryableByName)]
struct SequenceValue {
    #[diesel(sql_type = BigInt)]
    value: i64,
}

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Re-checks the coupon under a row lock and consumes one use of it.
fn redeem_coupon(
    conn: &mut PgConnection,
    draft: &CheckoutDraft,
    code: &str,
    now: DateTime<Utc>,
) -> Result<AppliedDiscount, DomainError> {
    let source = coupon_by_code(conn, &normalize_code(code), true)?.ok_or(DiscountRejection::NotFound)?;
    let uses = match (&source, draft.customer_id) {
        (CouponSource::Merchant(d), Some(customer_id)) => Some(count_customer_uses(conn, d.id, customer_id)?),
        _ => None,
    };
    let applied = source.evaluate(&draft.discount_lines(), uses, now)?;

    match applied.redemption {
        Redemption::Merchant { discount_id } => {
            let updated = diesel::update(
                discounts::table.find(discount_id).filter(
                    discounts::max_uses
                        .is_null()
                        .or(discounts::current_uses.lt(discounts::max_uses.assume_not_null())),
                ),
            )
            .set(discounts::current_uses.eq(discounts::current_uses + 1))
            .execute(conn)?;
            if updated == 0 {
                return Err(DiscountRejection::UsageLimitReached.into());
            }
        }
        Redemption::Newsletter { subscriber_id } => {
            let updated = diesel::update(
                newsletter_subscribers::table
                    .find(subscriber_id)
                    .filter(newsletter_subscribers::discount_used.eq(false)),
            )
            .set(newsletter_subscribers::discount_used.eq(true))
            .execute(conn)?;
            if updated == 0 {
                return Err(DiscountRejection::AlreadyUsed.into());
            }
        }
    }
    Ok(applied)
}

fn record(conn: &mut PgConnection, event: &OrderEvent) -> QueryResult<usize> {
    diesel::insert_into(order_outbox::table)
        .values(&NewOutboxEventRow::from(event))
        .execute(conn)
}

fn order_row(conn: &mut PgConnection, order: &OrderRef, lock: bool) -> QueryResult<Option<OrderRow>> {
    let query = orders::table.select(OrderRow::as_select());
    match (order, lock) {
        (OrderRef::Id(id), false) => query.filter(orders::id.eq(*id)).first(conn).optional(),
        (OrderRef::Id(id), true) => query.filter(orders::id.eq(*id)).for_update().first(conn).optional(),
        (OrderRef::Number(number), false) => query
            .filter(orders::order_number.eq(number.as_str()))
            .first(conn)
            .optional(),
        (OrderRef::Number(number), true) => query
            .filter(orders::order_number.eq(number.as_str()))
            .for_update()
            .first(conn)
            .optional(),
    }
}

fn items_of(conn: &mut PgConnection, order: &OrderRow) -> Result<Vec<OrderItem>, DomainError> {
    let rows = OrderItemRow::belonging_to(order)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?;
    rows.into_iter().map(OrderItem::try_from).collect()
}

impl OrderRepository for DieselOrderRepository {
    fn place_order(&self, draft: &CheckoutDraft, now: DateTime<Utc>) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock and redeem the coupon before anything else is written.
            let discount = match &draft.checkout.discount_code {
                Some(code) => Some(redeem_coupon(conn, draft, code, now)?),
                None => None,
            };

            // 2. Number the order and make sure its customer has a record.
            let seq = diesel::sql_query("SELECT nextval('order_number_seq') AS value")
                .get_result::<SequenceValue>(conn)?
                .value;
            let order_number = format_order_number(seq);
            let customer_id = draft.customer_id.unwrap_or_else(Uuid::new_v4);
            diesel::insert_into(customers::table)
                .values(&NewCustomerRow::from_billing(customer_id, &draft.checkout.billing, draft.checkout.is_company))
                .on_conflict(customers::id)
                .do_nothing()
                .execute(conn)?;
            let order = draft.finalize(customer_id, discount);

            // 3. Order header and frozen lines.
            diesel::insert_into(orders::table)
                .values(&NewOrderRow::new(&order, &order_number))
                .execute(conn)?;
            let items: Vec<NewOrderItemRow> = order.items.iter().map(NewOrderItemRow::from).collect();
            diesel::insert_into(order_items::table).values(&items).execute(conn)?;

            // 4. Take stock; the guard fails the whole order if a concurrent
            //    checkout got there first.
            for item in order.items.iter().filter(|i| i.track_stock) {
                let updated = diesel::update(
                    products::table
                        .find(item.product_id)
                        .filter(products::stock_quantity.ge(item.quantity)),
                )
                .set((
                    products::stock_quantity.eq(products::stock_quantity - item.quantity),
                    products::updated_at.eq(now),
                ))
                .execute(conn)?;
                if updated == 0 {
                    return Err(DomainError::invalid(format!(
                        "Insufficient stock for {}",
                        item.product_name
                    )));
                }
            }

            // 5. The source cart is spent.
            if let Some(cart_id) = draft.cart_id {
                diesel::delete(carts::table.find(cart_id)).execute(conn)?;
            }

            // 6. Outbox event in the same transaction.
            record(conn, &OrderEvent::placed(&order, &order_number))?;

            Ok(PlacedOrder {
                order_id: order.id,
                order_number,
                total: order.totals.total.clone(),
                payment_method: order.payment_method_code.clone(),
                bank_details: None,
            })
        })
    }

    fn find_order(&self, order: &OrderRef) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let Some(row) = order_row(&mut conn, order, false)? else {
            return Ok(None);
        };
        let items = items_of(&mut conn, &row)?;
        row.into_order(items).map(Some)
    }

    fn list_orders(&self, filter: &OrderFilter, paging: Paging) -> Result<OrderPage, DomainError> {
        let mut conn = self.pool.get()?;

        let filtered = || {
            let mut query = orders::table.into_boxed::<Pg>();
            if let Some(customer_id) = filter.customer_id {
                query = query.filter(orders::customer_id.eq(customer_id));
            }
            if let Some(status) = filter.status {
                query = query.filter(orders::status.eq(status.as_str()));
            }
            query
        };

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered().count().get_result(conn)?;

            let rows: Vec<OrderRow> = filtered()
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(paging.limit)
                .offset(paging.offset())
                .load(conn)?;
            let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&rows)
                .select(OrderItemRow::as_select())
                .order(order_items::created_at.asc())
                .load(conn)?;

            let orders = items
                .grouped_by(&rows)
                .into_iter()
                .zip(rows)
                .map(|(items, row)| {
                    let items = items
                        .into_iter()
                        .map(OrderItem::try_from)
                        .collect::<Result<Vec<_>, _>>()?;
                    row.into_order(items)
                })
                .collect::<Result<Vec<_>, DomainError>>()?;

            Ok(OrderPage { orders, total })
        })
    }

    fn apply_status_change(&self, order_id: Uuid, change: &StatusChange) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(orders::table.find(order_id))
                .set((
                    orders::status.eq(change.to.as_str()),
                    orders::tracking_number.eq(&change.tracking_number),
                    orders::shipped_at.eq(change.shipped_at),
                    orders::delivered_at.eq(change.delivered_at),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(DomainError::NotFound("Order"));
            }
            record(
                conn,
                &OrderEvent::StatusChanged {
                    order_id,
                    from: change.from,
                    to: change.to,
                    tracking_number: change.tracking_number.clone(),
                },
            )?;
            Ok(())
        })
    }

    fn mark_paid(&self, order: &OrderRef, reference: Option<String>, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = order_row(conn, order, true)?.ok_or(DomainError::NotFound("Order"))?;
            let current: PaymentStatus = row.payment_status.parse()?;
            if !current.accepts_payment()? {
                return Ok(false);
            }
            diesel::update(orders::table.find(row.id))
                .set((
                    orders::payment_status.eq(PaymentStatus::Paid.as_str()),
                    orders::payment_reference.eq(&reference),
                    orders::paid_at.eq(now),
                    orders::updated_at.eq(now),
                ))
                .execute(conn)?;
            record(
                conn,
                &OrderEvent::PaymentReceived {
                    order_id: row.id,
                    reference,
                    payment_status: PaymentStatus::Paid,
                },
            )?;
            Ok(true)
        })
    }

    fn swap_payment_status(&self, order_id: Uuid, expected: PaymentStatus, status: PaymentStatus) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            orders::table
                .find(order_id)
                .filter(orders::payment_status.eq(expected.as_str())),
        )
        .set((
            orders::payment_status.eq(status.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        if updated == 0 {
            let exists: i64 = orders::table.find(order_id).count().get_result(&mut conn)?;
            return Err(if exists == 0 {
                DomainError::NotFound("Order")
            } else {
                DomainError::Conflict("Payment status changed concurrently".into())
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::catalog::{Product, ProductInput};
    use crate::domain::discount::DiscountInput;
    use crate::domain::order::tests::billing;
    use crate::domain::order::{price_lines, OrderStatus, ShippingAddress, ValidCheckout};
    use crate::domain::ports::{CatalogRepository, DiscountRepository, ShippingRepository};
    use crate::domain::shipping::{PaymentMethod, ShippingMethod};
    use crate::infrastructure::catalog_repo::DieselCatalogRepository;
    use crate::infrastructure::discount_repo::DieselDiscountRepository;
    use crate::infrastructure::models::OutboxEventRow;
    use crate::infrastructure::shipping_repo::DieselShippingRepository;
    use crate::infrastructure::test_support::setup_db;
    use crate::schema::{payment_methods, shipping_methods};

    struct Fixture {
        product: Product,
        shipping: ShippingMethod,
        payment: PaymentMethod,
    }

    fn seed(pool: &DbPool, stock: i32) -> Fixture {
        let input: ProductInput = serde_json::from_value(json!({
            "sku": "IP15",
            "slug": "iphone-15",
            "name_sk": "iPhone 15",
            "price_without_vat": "100.00",
            "stock_quantity": stock
        }))
        .expect("valid input");
        let product = DieselCatalogRepository::new(pool.clone())
            .create_product(input.validate().expect("valid"))
            .expect("product created");

        let (shipping_id, payment_id) = (Uuid::new_v4(), Uuid::new_v4());
        {
            let mut conn = pool.get().expect("connection");
            diesel::insert_into(shipping_methods::table)
                .values((
                    shipping_methods::id.eq(shipping_id),
                    shipping_methods::code.eq("courier"),
                    shipping_methods::name_sk.eq("Kuriér"),
                    shipping_methods::price.eq(bigdecimal::BigDecimal::from(5)),
                ))
                .execute(&mut conn)
                .expect("shipping method inserted");
            diesel::insert_into(payment_methods::table)
                .values((
                    payment_methods::id.eq(payment_id),
                    payment_methods::code.eq("bank_transfer"),
                    payment_methods::name_sk.eq("Bankový prevod"),
                ))
                .execute(&mut conn)
                .expect("payment method inserted");
        }
        let shipping_repo = DieselShippingRepository::new(pool.clone());
        Fixture {
            product,
            shipping: shipping_repo
                .shipping_method(shipping_id)
                .expect("lookup")
                .expect("shipping method"),
            payment: shipping_repo
                .payment_method(payment_id)
                .expect("lookup")
                .expect("payment method"),
        }
    }

    fn draft(f: &Fixture, quantity: i32, discount_code: Option<&str>, customer_id: Option<Uuid>) -> CheckoutDraft {
        let billing = billing();
        CheckoutDraft {
            customer_id,
            cart_id: None,
            checkout: ValidCheckout {
                shipping: ShippingAddress::from(&billing),
                billing,
                shipping_method_id: f.shipping.id,
                payment_method_id: f.payment.id,
                discount_code: discount_code.map(str::to_string),
                note: None,
                is_company: false,
            },
            lines: price_lines(vec![(f.product.clone(), quantity)]).expect("priced"),
            shipping_method: f.shipping.clone(),
            payment_method: f.payment.clone(),
        }
    }

    fn events(pool: &DbPool, order_id: Uuid) -> Vec<OutboxEventRow> {
        let mut conn = pool.get().expect("connection");
        order_outbox::table
            .filter(order_outbox::aggregate_id.eq(order_id.to_string()))
            .select(OutboxEventRow::as_select())
            .order(order_outbox::created_at.asc())
            .load(&mut conn)
            .expect("query failed")
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn place_order_writes_order_stock_and_outbox_together() {
        let (_container, pool) = setup_db().await;
        let f = seed(&pool, 5);
        let repo = DieselOrderRepository::new(pool.clone());

        let placed = repo.place_order(&draft(&f, 2, None, None), Utc::now()).expect("placed");
        assert_eq!(placed.order_number, "OBJ000001");
        assert_eq!(placed.payment_method, "bank_transfer");

        let order = repo
            .find_order(&OrderRef::Number(placed.order_number.clone()))
            .expect("lookup")
            .expect("order stored");
        assert_eq!(order.id, placed.order_id);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.customer_id.is_some(), "guests get a customer id");

        let stock = DieselCatalogRepository::new(pool.clone())
            .product_by_id(f.product.id)
            .expect("lookup")
            .expect("product")
            .stock_quantity;
        assert_eq!(stock, 3);

        let events = events(&pool, placed.order_id);
        assert_eq!(events.len(), 1, "exactly one outbox event per order");
        assert_eq!(events[0].aggregate_type, "Order");
        assert_eq!(events[0].event_type, "OrderPlaced");
        assert_eq!(events[0].payload["order_number"], "OBJ000001");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn insufficient_stock_rolls_everything_back() {
        let (_container, pool) = setup_db().await;
        let f = seed(&pool, 1);
        let repo = DieselOrderRepository::new(pool.clone());

        let mut oversold = draft(&f, 1, None, None);
        oversold.lines[0].quantity = 3;
        let err = repo.place_order(&oversold, Utc::now()).expect_err("must fail");
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let page = repo
            .list_orders(&OrderFilter::default(), Paging::default())
            .expect("listed");
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn last_coupon_use_is_redeemed_once() {
        let (_container, pool) = setup_db().await;
        let f = seed(&pool, 10);
        let discounts = DieselDiscountRepository::new(pool.clone());
        let input: DiscountInput = serde_json::from_value(json!({
            "code": "LAST",
            "discount_type": "fixed",
            "value": "10",
            "max_uses": 1,
            "max_uses_per_customer": 5
        }))
        .expect("valid input");
        discounts.create_discount(input.validate().expect("valid")).expect("created");
        let repo = DieselOrderRepository::new(pool.clone());

        let placed = repo
            .place_order(&draft(&f, 1, Some(" last "), None), Utc::now())
            .expect("first use");
        let order = repo
            .find_order(&OrderRef::Id(placed.order_id))
            .expect("lookup")
            .expect("order");
        assert_eq!(order.discount_code.as_deref(), Some("LAST"));
        assert!(order.discount_id.is_some());

        let err = repo
            .place_order(&draft(&f, 1, Some("LAST"), None), Utc::now())
            .expect_err("limit reached");
        assert!(matches!(
            err,
            DomainError::Discount(DiscountRejection::UsageLimitReached)
        ));
        let stored = discounts.discounts().expect("listed");
        assert_eq!(stored[0].current_uses, 1);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn payment_is_recorded_once_and_status_changes_are_logged() {
        let (_container, pool) = setup_db().await;
        let f = seed(&pool, 10);
        let repo = DieselOrderRepository::new(pool.clone());
        let placed = repo
            .place_order(&draft(&f, 1, None, Some(Uuid::new_v4())), Utc::now())
            .expect("placed");
        let by_number = OrderRef::Number(placed.order_number.clone());

        assert!(repo.mark_paid(&by_number, Some("pi_1".into()), Utc::now()).expect("paid"));
        assert!(!repo.mark_paid(&by_number, Some("pi_1".into()), Utc::now()).expect("idempotent"));

        let order = repo.find_order(&by_number).expect("lookup").expect("order");
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.payment_reference.as_deref(), Some("pi_1"));

        let change = order
            .change_status(OrderStatus::Shipped, Some("TRK1".into()), Utc::now())
            .expect("valid change");
        repo.apply_status_change(order.id, &change).expect("applied");
        let shipped = repo
            .list_orders(
                &OrderFilter {
                    customer_id: None,
                    status: Some(OrderStatus::Shipped),
                },
                Paging::default(),
            )
            .expect("listed");
        assert_eq!(shipped.total, 1);
        assert_eq!(shipped.orders[0].tracking_number.as_deref(), Some("TRK1"));
        assert_eq!(shipped.orders[0].items.len(), 1);

        let kinds: Vec<String> = events(&pool, order.id).into_iter().map(|e| e.event_type).collect();
        assert_eq!(kinds, vec!["OrderPlaced", "PaymentReceived", "OrderStatusChanged"]);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn payment_status_swap_rejects_a_stale_expectation() {
        let (_container, pool) = setup_db().await;
        let f = seed(&pool, 10);
        let repo = DieselOrderRepository::new(pool.clone());
        let placed = repo
            .place_order(&draft(&f, 1, None, None), Utc::now())
            .expect("placed");
        assert!(repo
            .mark_paid(&OrderRef::Id(placed.order_id), None, Utc::now())
            .expect("paid"));

        repo.swap_payment_status(placed.order_id, PaymentStatus::Paid, PaymentStatus::Refunded)
            .expect("refunded");
        let err = repo
            .swap_payment_status(placed.order_id, PaymentStatus::Paid, PaymentStatus::PartiallyRefunded)
            .expect_err("stale");
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(matches!(
            repo.swap_payment_status(Uuid::new_v4(), PaymentStatus::Paid, PaymentStatus::Refunded),
            Err(DomainError::NotFound("Order"))
        ));

        let order = repo
            .find_order(&OrderRef::Id(placed.order_id))
            .expect("lookup")
            .expect("order");
        assert_eq!(order.payment_status, PaymentStatus::Refunded);
    }
}
