//! Payment provider callbacks. These are unauthenticated; Stripe events are
//! signed, TrustPay ones are matched by order number.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::application::payment_service::TrustPayNotification;
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking;

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /payments/webhooks/stripe
///
/// The raw body is needed to verify the signature, so it is not parsed as
/// JSON by the extractor.
#[utoipa::path(
    post,
    path = "/payments/webhooks/stripe",
    request_body(content = String, content_type = "application/json", description = "Stripe event"),
    params(("Stripe-Signature" = Option<String>, Header, description = "Required when a webhook secret is configured")),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Bad signature or malformed event"),
    ),
    tag = "payments"
)]
pub async fn stripe_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    blocking(&state, move |s| {
        s.payments.stripe_webhook(&body, signature.as_deref(), Utc::now())
    })
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "received": true })))
}

#[utoipa::path(
    post,
    path = "/payments/webhooks/trustpay",
    request_body(content = String, content_type = "application/x-www-form-urlencoded", description = "RES, REF and PID fields"),
    responses((status = 200, description = "Notification processed", body = String)),
    tag = "payments"
)]
pub async fn trustpay_webhook(
    state: web::Data<AppState>,
    form: web::Form<TrustPayNotification>,
) -> Result<HttpResponse, AppError> {
    let notification = form.into_inner();
    blocking(&state, move |s| s.payments.trustpay_webhook(notification, Utc::now())).await?;
    Ok(HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("OK"))
}
