use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::newsletter::{SubscribeRequest, SubscribeResult, Subscriber, SubscriptionStatus};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, created, done, ok, Page, PageParams};

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub email: String,
}

/// POST /newsletter/subscribe
///
/// Hands out a one-time 5 % code valid for 24 hours.
#[utoipa::path(
    post,
    path = "/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscribeResult),
        (status = 400, description = "Invalid email or missing consent"),
        (status = 409, description = "Email is already subscribed"),
    ),
    tag = "newsletter"
)]
pub async fn subscribe(
    state: web::Data<AppState>,
    body: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let result = blocking(&state, move |s| s.newsletter.subscribe(request, Utc::now())).await?;
    Ok(created(result))
}

#[utoipa::path(
    get,
    path = "/newsletter/status",
    params(("email" = String, Query, description = "Subscriber email")),
    responses((status = 200, description = "Subscription state", body = SubscriptionStatus)),
    tag = "newsletter"
)]
pub async fn subscription_status(
    state: web::Data<AppState>,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, AppError> {
    let email = query.into_inner().email;
    let status = blocking(&state, move |s| s.newsletter.status(&email, Utc::now())).await?;
    Ok(ok(status))
}

#[utoipa::path(
    post,
    path = "/newsletter/unsubscribe",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Unsubscribed"),
        (status = 404, description = "Subscriber not found"),
    ),
    tag = "newsletter"
)]
pub async fn unsubscribe(state: web::Data<AppState>, body: web::Json<EmailRequest>) -> Result<HttpResponse, AppError> {
    let email = body.into_inner().email;
    blocking(&state, move |s| s.newsletter.unsubscribe(&email, Utc::now())).await?;
    Ok(done("Unsubscribed"))
}

#[utoipa::path(
    get,
    path = "/admin/newsletter/subscribers",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses((status = 200, description = "Subscribers, newest first", body = [Subscriber])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn list_subscribers(
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let paging = query.paging();
    let (subscribers, total) = blocking(&state, move |s| s.newsletter.subscribers(paging)).await?;
    Ok(ok(Page::new(subscribers, total, paging)))
}
