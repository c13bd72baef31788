//! Delivery and payment options offered at checkout.

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::shipping::{PaymentFeeQuote, PaymentMethod, ShippingMethod, ShippingQuote};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, ok};

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CostQuery {
    pub order_total: Option<BigDecimal>,
}

#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    pub amount: Option<BigDecimal>,
}

#[utoipa::path(
    get,
    path = "/shipping/methods",
    params(("country" = Option<String>, Query, description = "ISO country code, e.g. SK")),
    responses((status = 200, description = "Active shipping methods", body = [ShippingMethod])),
    tag = "shipping"
)]
pub async fn list_shipping_methods(
    state: web::Data<AppState>,
    query: web::Query<CountryQuery>,
) -> Result<HttpResponse, AppError> {
    let country = query.into_inner().country;
    let methods = blocking(&state, move |s| s.shipping.shipping_methods(country.as_deref())).await?;
    Ok(ok(methods))
}

#[utoipa::path(
    get,
    path = "/shipping/methods/{id}",
    params(("id" = Uuid, Path, description = "Shipping method UUID")),
    responses(
        (status = 200, description = "Shipping method", body = ShippingMethod),
        (status = 404, description = "Shipping method not found"),
    ),
    tag = "shipping"
)]
pub async fn get_shipping_method(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let method = blocking(&state, move |s| s.shipping.shipping_method(id)).await?;
    Ok(ok(method))
}

/// GET /shipping/methods/{id}/cost
///
/// Price for an order value, free above the method's threshold.
#[utoipa::path(
    get,
    path = "/shipping/methods/{id}/cost",
    params(
        ("id" = Uuid, Path, description = "Shipping method UUID"),
        ("order_total" = Option<String>, Query, description = "Items total with VAT"),
    ),
    responses(
        (status = 200, description = "Shipping quote", body = ShippingQuote),
        (status = 404, description = "Shipping method not found"),
    ),
    tag = "shipping"
)]
pub async fn shipping_cost(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CostQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order_total = query.into_inner().order_total;
    let quote = blocking(&state, move |s| s.shipping.shipping_quote(id, order_total)).await?;
    Ok(ok(quote))
}

#[utoipa::path(
    get,
    path = "/payments/methods",
    responses((status = 200, description = "Active payment methods", body = [PaymentMethod])),
    tag = "payments"
)]
pub async fn list_payment_methods(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let methods = blocking(&state, |s| s.shipping.payment_methods()).await?;
    Ok(ok(methods))
}

#[utoipa::path(
    get,
    path = "/payments/methods/{id}",
    params(("id" = Uuid, Path, description = "Payment method UUID")),
    responses(
        (status = 200, description = "Payment method", body = PaymentMethod),
        (status = 404, description = "Payment method not found"),
    ),
    tag = "payments"
)]
pub async fn get_payment_method(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let method = blocking(&state, move |s| s.shipping.payment_method(id)).await?;
    Ok(ok(method))
}

#[utoipa::path(
    get,
    path = "/payments/methods/{id}/fee",
    params(
        ("id" = Uuid, Path, description = "Payment method UUID"),
        ("amount" = Option<String>, Query, description = "Amount the fee is computed on"),
    ),
    responses(
        (status = 200, description = "Fee quote", body = PaymentFeeQuote),
        (status = 404, description = "Payment method not found"),
    ),
    tag = "payments"
)]
pub async fn payment_fee(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<FeeQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let amount = query.into_inner().amount;
    let quote = blocking(&state, move |s| s.shipping.fee_quote(id, amount)).await?;
    Ok(ok(quote))
}
