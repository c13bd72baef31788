use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{CheckoutRequest, Order, OrderRef, OrderStatus, PaymentStatus, PlacedOrder, TrackingInfo};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, created, customer_id, ok, require_customer, Page, PageParams};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdminOrdersParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct MarkPaidRequest {
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct RefundRequest {
    /// Amount to refund; the whole order when omitted.
    #[schema(value_type = Option<String>)]
    pub amount: Option<BigDecimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkPaidResponse {
    /// `false` when the payment had already been recorded.
    pub recorded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundResponse {
    pub payment_status: PaymentStatus,
}

// ── Storefront ───────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order from a cart or an explicit item list. Coupon redemption,
/// stock, the order rows and the outbox event are written in a single
/// database transaction.
#[utoipa::path(
    post,
    path = "/orders",
    params(("X-Customer-Id" = Option<Uuid>, Header, description = "Logged-in customer; guests get a new customer record")),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = PlacedOrder),
        (status = 400, description = "Invalid checkout, empty cart, stock or coupon problem"),
        (status = 404, description = "Shipping method, payment method or product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let customer = customer_id(&req)?;
    let request = body.into_inner();
    let placed = blocking(&state, move |s| s.checkout.place_order(request, customer, Utc::now())).await?;
    Ok(created(placed))
}

/// GET /orders
///
/// The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("X-Customer-Id" = Uuid, Header, description = "Logged-in customer"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = [Order]),
        (status = 400, description = "Login required"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let customer = require_customer(&req)?;
    let paging = query.paging();
    let page = blocking(&state, move |s| s.orders.customer_orders(customer, paging)).await?;
    Ok(ok(Page::new(page.orders, page.total, paging)))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-Customer-Id" = Option<Uuid>, Header, description = "When present the order must belong to this customer"),
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer = customer_id(&req)?;
    let id = path.into_inner();
    let order = blocking(&state, move |s| s.orders.get_order(id, customer)).await?;
    Ok(ok(order))
}

#[utoipa::path(
    get,
    path = "/orders/tracking/{order_number}",
    params(("order_number" = String, Path, description = "Order number, e.g. OBJ000042")),
    responses(
        (status = 200, description = "Shipment state", body = TrackingInfo),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn track_order(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let number = path.into_inner();
    let tracking = blocking(&state, move |s| s.orders.tracking(&number)).await?;
    Ok(ok(tracking))
}

// ── Back office ──────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("status" = Option<OrderStatus>, Query, description = "Only orders in this status"),
    ),
    responses((status = 200, description = "Paginated list of orders", body = [Order])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn admin_list_orders(
    state: web::Data<AppState>,
    query: web::Query<AdminOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let paging = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .paging();
    let status = params.status;
    let page = blocking(&state, move |s| s.orders.list_orders(status, paging)).await?;
    Ok(ok(Page::new(page.orders, page.total, paging)))
}

#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn admin_get_order(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = blocking(&state, move |s| s.orders.admin_order(id)).await?;
    Ok(ok(order))
}

/// PUT /admin/orders/{id}/status
///
/// Moving to `shipped` needs a tracking number, given here or stored earlier.
#[utoipa::path(
    put,
    path = "/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status changed", body = Order),
        (status = 400, description = "Tracking number missing"),
        (status = 404, description = "Order not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let StatusUpdateRequest { status, tracking_number } = body.into_inner();
    let order = blocking(&state, move |s| s.orders.update_status(id, status, tracking_number, Utc::now())).await?;
    Ok(ok(order))
}

#[utoipa::path(
    post,
    path = "/admin/orders/{id}/mark-paid",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = MarkPaidRequest,
    responses(
        (status = 200, description = "Payment recorded", body = MarkPaidResponse),
        (status = 409, description = "Order has already been refunded"),
        (status = 404, description = "Order not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn mark_paid(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: Option<web::Json<MarkPaidRequest>>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let reference = body.map(|b| b.into_inner()).unwrap_or_default().reference;
    let recorded =
        blocking(&state, move |s| s.orders.mark_paid(&OrderRef::Id(id), reference, Utc::now())).await?;
    Ok(ok(MarkPaidResponse { recorded }))
}

#[utoipa::path(
    post,
    path = "/admin/orders/{id}/refund",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Refund recorded", body = RefundResponse),
        (status = 400, description = "Order is not paid"),
        (status = 409, description = "Payment status changed concurrently"),
        (status = 404, description = "Order not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn refund(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: Option<web::Json<RefundRequest>>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let amount = body.map(|b| b.into_inner()).unwrap_or_default().amount;
    let payment_status = blocking(&state, move |s| s.orders.refund(id, amount)).await?;
    Ok(ok(RefundResponse { payment_status }))
}
