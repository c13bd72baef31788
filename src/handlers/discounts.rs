use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartOwner;
use crate::domain::discount::{ActiveDiscount, AppliedDiscount, Discount, DiscountInput, DiscountStats};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, created, customer_id, done, ok, session_id};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateRequest {
    pub code: String,
    /// Cart value with VAT; the caller's cart is priced when omitted.
    #[schema(value_type = Option<String>)]
    pub cart_total: Option<BigDecimal>,
}

/// POST /discounts/validate
///
/// Checks a merchant or newsletter code against a cart without redeeming it.
#[utoipa::path(
    post,
    path = "/discounts/validate",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Code applies", body = AppliedDiscount),
        (status = 400, description = "Code rejected, the message says why"),
    ),
    tag = "discounts"
)]
pub async fn validate_code(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ValidateRequest>,
) -> Result<HttpResponse, AppError> {
    let ValidateRequest { code, cart_total } = body.into_inner();
    // Anonymous validation with an explicit total is allowed.
    let owner = CartOwner::resolve(customer_id(&req)?, session_id(&req)).ok();
    let applied = blocking(&state, move |s| {
        s.discounts.validate(&code, cart_total, owner.as_ref(), Utc::now())
    })
    .await?;
    Ok(ok(applied))
}

#[utoipa::path(
    get,
    path = "/discounts/active",
    responses((status = 200, description = "Codes currently on offer", body = [ActiveDiscount])),
    tag = "discounts"
)]
pub async fn active_discounts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let discounts = blocking(&state, |s| s.discounts.active(Utc::now())).await?;
    Ok(ok(discounts))
}

// ── Back office ──────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/discounts",
    responses((status = 200, description = "All discount codes", body = [Discount])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn list_discounts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let discounts = blocking(&state, |s| s.discounts.list()).await?;
    Ok(ok(discounts))
}

#[utoipa::path(
    post,
    path = "/admin/discounts",
    request_body = DiscountInput,
    responses(
        (status = 201, description = "Discount created", body = Discount),
        (status = 400, description = "Invalid discount"),
        (status = 409, description = "Code already exists"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn create_discount(
    state: web::Data<AppState>,
    body: web::Json<DiscountInput>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let discount = blocking(&state, move |s| s.discounts.create(input)).await?;
    Ok(created(discount))
}

#[utoipa::path(
    put,
    path = "/admin/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount UUID")),
    request_body = DiscountInput,
    responses(
        (status = 200, description = "Discount replaced", body = Discount),
        (status = 404, description = "Discount not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn update_discount(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<DiscountInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner();
    let discount = blocking(&state, move |s| s.discounts.update(id, input)).await?;
    Ok(ok(discount))
}

#[utoipa::path(
    delete,
    path = "/admin/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount UUID")),
    responses(
        (status = 200, description = "Discount deleted"),
        (status = 404, description = "Discount not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn delete_discount(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(&state, move |s| s.discounts.delete(id)).await?;
    Ok(done("Discount deleted"))
}

#[utoipa::path(
    get,
    path = "/admin/discounts/stats",
    responses((status = 200, description = "Usage summary", body = DiscountStats)),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn discount_stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = blocking(&state, |s| s.discounts.stats(Utc::now())).await?;
    Ok(ok(stats))
}
