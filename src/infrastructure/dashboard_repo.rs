use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::dashboard::{
    CustomerSummary, DashboardData, ItemFact, OrderFact, ReviewFact, StockFact, SubscriberFact,
};
use crate::domain::discount::Discount;
use crate::domain::errors::DomainError;
use crate::domain::money::zero;
use crate::domain::order::OrderStatus;
use crate::domain::ports::{DashboardRepository, Paging};
use crate::schema::{
    categories, customers, discounts, newsletter_subscribers, order_items, orders, product_reviews, products,
};

use super::like_pattern;
use super::models::{CustomerRow, DiscountRow};

type OrderColumns = (
    Uuid,
    String,
    String,
    String,
    BigDecimal,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

type ItemColumns = (Uuid, Option<Uuid>, String, i32, BigDecimal, Option<String>);

/// Read side of the back office.
pub struct DieselDashboardRepository {
    pool: DbPool,
}

impl DieselDashboardRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn order_facts(conn: &mut PgConnection) -> Result<(Vec<OrderFact>, Vec<ItemFact>), DomainError> {
    let order_rows: Vec<OrderColumns> = orders::table
        .select((
            orders::id,
            orders::order_number,
            orders::status,
            orders::payment_status,
            orders::total,
            orders::billing_first_name,
            orders::billing_last_name,
            orders::billing_country,
            orders::payment_method_name,
            orders::payment_method_code,
            orders::shipping_method_name,
            orders::created_at,
        ))
        .order(orders::created_at.desc())
        .load(conn)?;
    let item_rows: Vec<ItemColumns> = order_items::table
        .left_join(products::table.left_join(categories::table))
        .select((
            order_items::order_id,
            order_items::product_id,
            order_items::product_name,
            order_items::quantity,
            order_items::line_total,
            categories::name_sk.nullable(),
        ))
        .load(conn)?;

    let mut item_counts: HashMap<Uuid, i64> = HashMap::new();
    for (order_id, _, _, quantity, _, _) in &item_rows {
        *item_counts.entry(*order_id).or_default() += i64::from(*quantity);
    }

    let mut statuses: HashMap<Uuid, OrderStatus> = HashMap::new();
    let mut facts = Vec::with_capacity(order_rows.len());
    for (id, number, status, payment_status, total, first, last, country, pm_name, pm_code, sm_name, created_at) in
        order_rows
    {
        let status: OrderStatus = status.parse()?;
        statuses.insert(id, status);
        facts.push(OrderFact {
            id,
            order_number: number,
            status,
            payment_status: payment_status.parse()?,
            total,
            customer_name: format!("{first} {last}"),
            country,
            payment_method: pm_name.or(pm_code),
            shipping_method: sm_name,
            item_count: item_counts.get(&id).copied().unwrap_or(0),
            created_at,
        });
    }

    let items = item_rows
        .into_iter()
        .filter(|(order_id, ..)| {
            statuses
                .get(order_id)
                .is_some_and(|s| !matches!(s, OrderStatus::Cancelled | OrderStatus::Returned))
        })
        .map(|(_, product_id, product_name, quantity, line_total, category)| ItemFact {
            product_id,
            product_name,
            category,
            quantity,
            line_total,
        })
        .collect();

    Ok((facts, items))
}

impl DashboardRepository for DieselDashboardRepository {
    fn snapshot(&self, now: DateTime<Utc>) -> Result<DashboardData, DomainError> {
        let mut conn = self.pool.get()?;

        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let (orders, items) = order_facts(conn)?;
                let customers: i64 = customers::table.count().get_result(conn)?;

                let stock = products::table
                    .filter(products::is_active.eq(true))
                    .filter(products::track_stock.eq(true))
                    .select((
                        products::id,
                        products::sku,
                        products::name_sk,
                        products::stock_quantity,
                        products::low_stock_threshold,
                    ))
                    .load::<(Uuid, String, String, i32, i32)>(conn)?
                    .into_iter()
                    .map(|(id, sku, name, stock_quantity, low_stock_threshold)| StockFact {
                        id,
                        sku,
                        name,
                        stock_quantity,
                        low_stock_threshold,
                    })
                    .collect();

                let subscribers = newsletter_subscribers::table
                    .select((
                        newsletter_subscribers::is_active,
                        newsletter_subscribers::discount_used,
                        newsletter_subscribers::subscribed_at,
                    ))
                    .load::<(bool, bool, DateTime<Utc>)>(conn)?
                    .into_iter()
                    .map(|(is_active, discount_used, subscribed_at)| SubscriberFact {
                        is_active,
                        discount_used,
                        subscribed_at,
                    })
                    .collect();

                let reviews = product_reviews::table
                    .select((product_reviews::rating, product_reviews::is_approved))
                    .load::<(i32, bool)>(conn)?
                    .into_iter()
                    .map(|(rating, is_approved)| ReviewFact { rating, is_approved })
                    .collect();

                let discounts = discounts::table
                    .select(DiscountRow::as_select())
                    .load::<DiscountRow>(conn)?
                    .into_iter()
                    .map(Discount::try_from)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(DashboardData {
                    now,
                    orders,
                    items,
                    customers,
                    stock,
                    subscribers,
                    reviews,
                    discounts,
                })
            })
    }

    fn customers(&self, search: Option<&str>, paging: Paging) -> Result<(Vec<CustomerSummary>, i64), DomainError> {
        let mut conn = self.pool.get()?;
        let pattern = search.map(str::trim).filter(|t| !t.is_empty()).map(like_pattern);

        let filtered = || {
            let mut query = customers::table.into_boxed::<Pg>();
            if let Some(pattern) = &pattern {
                query = query.filter(
                    customers::email
                        .ilike(pattern.clone())
                        .or(customers::first_name.ilike(pattern.clone()))
                        .or(customers::last_name.ilike(pattern.clone())),
                );
            }
            query
        };

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered().count().get_result(conn)?;
            let rows: Vec<CustomerRow> = filtered()
                .select(CustomerRow::as_select())
                .order(customers::created_at.desc())
                .then_order_by(customers::id)
                .limit(paging.limit)
                .offset(paging.offset())
                .load(conn)?;

            let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
            let placed: Vec<(Option<Uuid>, String, BigDecimal)> = orders::table
                .filter(orders::customer_id.eq_any(ids))
                .select((orders::customer_id, orders::status, orders::total))
                .load(conn)?;

            let mut totals: HashMap<Uuid, (i64, BigDecimal)> = HashMap::new();
            for (customer_id, status, total) in placed {
                let Some(customer_id) = customer_id else {
                    continue;
                };
                let entry = totals.entry(customer_id).or_insert_with(|| (0, zero()));
                entry.0 += 1;
                if status != OrderStatus::Cancelled.as_str() {
                    entry.1 += total;
                }
            }

            let summaries = rows
                .into_iter()
                .map(|r| {
                    let (order_count, total_spent) = totals.remove(&r.id).unwrap_or_else(|| (0, zero()));
                    CustomerSummary {
                        id: r.id,
                        email: r.email,
                        first_name: r.first_name,
                        last_name: r.last_name,
                        phone: r.phone,
                        customer_type: r.customer_type,
                        company_name: r.company_name,
                        country: r.country,
                        order_count,
                        total_spent,
                        created_at: r.created_at,
                    }
                })
                .collect();
            Ok((summaries, total))
        })
    }
}
