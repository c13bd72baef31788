//! Back-office dashboard. The repository loads a consistent snapshot of
//! facts; everything below is a pure reduction over it.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::discount::Discount;
use super::money::{round2, sum, to_f64, zero};
use super::order::{OrderStatus, PaymentStatus};
use super::review::round1;

const TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct OrderFact {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: BigDecimal,
    pub customer_name: String,
    pub country: String,
    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderFact {
    fn counts_as_revenue(&self) -> bool {
        !matches!(self.status, OrderStatus::Cancelled | OrderStatus::Returned)
    }
}

/// An order line of a revenue-bearing order.
#[derive(Debug, Clone)]
pub struct ItemFact {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub line_total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct StockFact {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
}

#[derive(Debug, Clone)]
pub struct SubscriberFact {
    pub is_active: bool,
    pub discount_used: bool,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewFact {
    pub rating: i32,
    pub is_approved: bool,
}

#[derive(Debug, Clone)]
pub struct DashboardData {
    pub now: DateTime<Utc>,
    pub orders: Vec<OrderFact>,
    pub items: Vec<ItemFact>,
    pub customers: i64,
    /// Active, stock-tracked products.
    pub stock: Vec<StockFact>,
    pub subscribers: Vec<SubscriberFact>,
    pub reviews: Vec<ReviewFact>,
    pub discounts: Vec<Discount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Totals {
    pub orders: i64,
    #[schema(value_type = String)]
    pub revenue: BigDecimal,
    pub customers: i64,
    pub pending_payments: i64,
    #[schema(value_type = String)]
    pub average_order_value: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Periods {
    pub orders_this_week: i64,
    pub orders_last_week: i64,
    #[schema(value_type = String)]
    pub revenue_today: BigDecimal,
    #[schema(value_type = String)]
    pub revenue_yesterday: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecentOrder {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub total: BigDecimal,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthRevenue {
    pub month: u32,
    pub orders: i64,
    #[schema(value_type = String)]
    pub revenue: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryShare {
    pub category: String,
    #[schema(value_type = String)]
    pub revenue: BigDecimal,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Option<Uuid>,
    pub name: String,
    pub quantity: i64,
    #[schema(value_type = String)]
    pub revenue: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LowStock {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Usage {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NewsletterSummary {
    pub total: i64,
    pub this_month: i64,
    pub coupons_used: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReviewSummary {
    pub pending: i64,
    pub average_rating: f64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DiscountSummary {
    pub active: i64,
    pub expiring_soon: i64,
    pub total_uses: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Alerts {
    pub stale_pending_orders: i64,
    pub out_of_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Dashboard {
    pub totals: Totals,
    pub periods: Periods,
    pub orders_by_status: BTreeMap<String, i64>,
    pub recent_orders: Vec<RecentOrder>,
    pub revenue_by_month: Vec<MonthRevenue>,
    pub category_sales: Vec<CategoryShare>,
    pub top_products: Vec<TopProduct>,
    pub low_stock: Vec<LowStock>,
    pub payment_methods: Vec<Usage>,
    pub shipping_methods: Vec<Usage>,
    pub newsletter: NewsletterSummary,
    pub reviews: ReviewSummary,
    pub discounts: DiscountSummary,
    pub top_countries: Vec<Usage>,
    pub alerts: Alerts,
}

/// Row of the back-office customer list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub customer_type: String,
    pub company_name: Option<String>,
    pub country: String,
    pub order_count: i64,
    #[schema(value_type = String)]
    pub total_spent: BigDecimal,
    pub created_at: DateTime<Utc>,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn revenue_of<'a>(orders: impl Iterator<Item = &'a OrderFact>) -> BigDecimal {
    round2(&orders.fold(zero(), |acc, o| acc + &o.total))
}

/// Counts by name, most used first, ties by name.
fn usage<'a>(names: impl Iterator<Item = &'a str>, limit: Option<usize>) -> Vec<Usage> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut usage: Vec<Usage> = counts
        .into_iter()
        .map(|(name, count)| Usage {
            name: name.to_string(),
            count,
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    if let Some(limit) = limit {
        usage.truncate(limit);
    }
    usage
}

impl Dashboard {
    pub fn compute(data: &DashboardData) -> Self {
        let now = data.now;
        let today = now.date_naive();
        let start_of_today = midnight(today);
        let start_of_week =
            midnight(today - Duration::days(i64::from(today.weekday().num_days_from_monday())));
        let start_of_last_week = start_of_week - Duration::days(7);

        let revenue_orders: Vec<&OrderFact> =
            data.orders.iter().filter(|o| o.counts_as_revenue()).collect();
        let revenue = revenue_of(revenue_orders.iter().copied());
        let average_order_value = if revenue_orders.is_empty() {
            round2(&zero())
        } else {
            round2(&(&revenue / BigDecimal::from(revenue_orders.len() as i64)))
        };

        let totals = Totals {
            orders: data.orders.len() as i64,
            revenue,
            customers: data.customers,
            pending_payments: data
                .orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .filter(|o| matches!(o.payment_status, PaymentStatus::Pending | PaymentStatus::Awaiting))
                .count() as i64,
            average_order_value,
        };

        let in_range = |o: &&OrderFact, from: DateTime<Utc>, to: DateTime<Utc>| {
            o.created_at >= from && o.created_at < to
        };
        let end_of_today = start_of_today + Duration::days(1);
        let periods = Periods {
            orders_this_week: data
                .orders
                .iter()
                .filter(|o| in_range(o, start_of_week, end_of_today))
                .count() as i64,
            orders_last_week: data
                .orders
                .iter()
                .filter(|o| in_range(o, start_of_last_week, start_of_week))
                .count() as i64,
            revenue_today: revenue_of(
                revenue_orders
                    .iter()
                    .copied()
                    .filter(|o| in_range(o, start_of_today, end_of_today)),
            ),
            revenue_yesterday: revenue_of(
                revenue_orders
                    .iter()
                    .copied()
                    .filter(|o| in_range(o, start_of_today - Duration::days(1), start_of_today)),
            ),
        };

        let mut orders_by_status: BTreeMap<String, i64> = OrderStatus::ALL
            .into_iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for o in &data.orders {
            *orders_by_status.entry(o.status.as_str().to_string()).or_default() += 1;
        }

        let mut newest: Vec<&OrderFact> = data.orders.iter().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_orders = newest
            .into_iter()
            .take(TOP_N)
            .map(|o| RecentOrder {
                id: o.id,
                order_number: o.order_number.clone(),
                customer_name: o.customer_name.clone(),
                status: o.status,
                total: o.total.clone(),
                item_count: o.item_count,
                created_at: o.created_at,
            })
            .collect();

        let revenue_by_month = (1..=12)
            .map(|month| {
                let in_month: Vec<&OrderFact> = revenue_orders
                    .iter()
                    .copied()
                    .filter(|o| o.created_at.year() == now.year() && o.created_at.month() == month)
                    .collect();
                MonthRevenue {
                    month,
                    orders: in_month.len() as i64,
                    revenue: revenue_of(in_month.into_iter()),
                }
            })
            .collect();

        let newsletter = NewsletterSummary {
            total: data.subscribers.iter().filter(|s| s.is_active).count() as i64,
            this_month: data
                .subscribers
                .iter()
                .filter(|s| s.subscribed_at.year() == now.year() && s.subscribed_at.month() == now.month())
                .count() as i64,
            coupons_used: data.subscribers.iter().filter(|s| s.discount_used).count() as i64,
        };

        let approved: Vec<i32> = data
            .reviews
            .iter()
            .filter(|r| r.is_approved)
            .map(|r| r.rating)
            .collect();
        let reviews = ReviewSummary {
            pending: data.reviews.iter().filter(|r| !r.is_approved).count() as i64,
            average_rating: if approved.is_empty() {
                0.0
            } else {
                round1(approved.iter().map(|&r| f64::from(r)).sum::<f64>() / approved.len() as f64)
            },
            total: data.reviews.len() as i64,
        };

        let soon = now + Duration::days(7);
        let live: Vec<&Discount> = data
            .discounts
            .iter()
            .filter(|d| d.is_active && d.valid_from <= now && !d.is_expired(now))
            .collect();
        let discounts = DiscountSummary {
            active: live.len() as i64,
            expiring_soon: live
                .iter()
                .filter(|d| d.valid_until.is_some_and(|until| until <= soon))
                .count() as i64,
            total_uses: data.discounts.iter().map(|d| i64::from(d.current_uses)).sum(),
        };

        let stale_before = now - Duration::hours(24);
        let alerts = Alerts {
            stale_pending_orders: data
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending && o.created_at < stale_before)
                .count() as i64,
            out_of_stock: data.stock.iter().filter(|p| p.stock_quantity <= 0).count() as i64,
        };

        Dashboard {
            totals,
            periods,
            orders_by_status,
            recent_orders,
            revenue_by_month,
            category_sales: category_sales(&data.items),
            top_products: top_products(&data.items),
            low_stock: low_stock(&data.stock),
            payment_methods: usage(
                data.orders.iter().filter_map(|o| o.payment_method.as_deref()),
                None,
            ),
            shipping_methods: usage(
                data.orders.iter().filter_map(|o| o.shipping_method.as_deref()),
                None,
            ),
            newsletter,
            reviews,
            discounts,
            top_countries: usage(data.orders.iter().map(|o| o.country.as_str()), Some(TOP_N)),
            alerts,
        }
    }
}

const UNCATEGORIZED: &str = "Other";

fn category_sales(items: &[ItemFact]) -> Vec<CategoryShare> {
    let mut by_category: HashMap<&str, BigDecimal> = HashMap::new();
    for item in items {
        let key = item.category.as_deref().unwrap_or(UNCATEGORIZED);
        *by_category.entry(key).or_insert_with(zero) += &item.line_total;
    }
    let grand_total = sum(by_category.values());
    let mut shares: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, revenue)| {
            let share = if grand_total > zero() {
                (to_f64(&revenue) / to_f64(&grand_total) * 100.0).round() as i64
            } else {
                0
            };
            CategoryShare {
                category: category.to_string(),
                revenue: round2(&revenue),
                percentage: share,
            }
        })
        .collect();
    shares.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.category.cmp(&b.category)));
    shares
}

fn top_products(items: &[ItemFact]) -> Vec<TopProduct> {
    let mut by_product: HashMap<(Option<Uuid>, &str), (i64, BigDecimal)> = HashMap::new();
    for item in items {
        let entry = by_product
            .entry((item.product_id, item.product_name.as_str()))
            .or_insert_with(|| (0, zero()));
        entry.0 += i64::from(item.quantity);
        entry.1 += &item.line_total;
    }
    let mut top: Vec<TopProduct> = by_product
        .into_iter()
        .map(|((product_id, name), (quantity, revenue))| TopProduct {
            product_id,
            name: name.to_string(),
            quantity,
            revenue: round2(&revenue),
        })
        .collect();
    top.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    top.truncate(TOP_N);
    top
}

fn low_stock(stock: &[StockFact]) -> Vec<LowStock> {
    let mut low: Vec<&StockFact> = stock
        .iter()
        .filter(|p| p.stock_quantity <= p.low_stock_threshold)
        .collect();
    low.sort_by_key(|p| p.stock_quantity);
    low.into_iter()
        .take(TOP_N)
        .map(|p| LowStock {
            id: p.id,
            sku: p.sku.clone(),
            name: p.name.clone(),
            stock_quantity: p.stock_quantity,
            low_stock_threshold: p.low_stock_threshold,
        })
        .collect()
}
