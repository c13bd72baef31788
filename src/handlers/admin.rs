//! Back-office guard and reporting endpoints.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::domain::dashboard::{CustomerSummary, Dashboard};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, ok, Page, PageParams};

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Compares MACs of both tokens so the check takes the same time wherever
/// they differ.
fn token_matches(given: &str, expected: &str) -> bool {
    let Ok(mut reference) = Hmac::<Sha256>::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    let mut candidate = reference.clone();
    reference.update(expected.as_bytes());
    candidate.update(given.as_bytes());
    candidate.verify_slice(&reference.finalize().into_bytes()).is_ok()
}

/// Rejects admin requests whose bearer token does not match `ADMIN_TOKEN`.
pub async fn require_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state missing".into()))?;
    let authorized = bearer_token(&req).is_some_and(|token| token_matches(token, &state.admin_token));
    if !authorized {
        log::warn!("Rejected admin request to {}", req.path());
        return Err(AppError::Unauthorized.into());
    }
    next.call(req).await
}

/// GET /admin/dashboard
///
/// All figures come from one consistent snapshot.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Store overview", body = Dashboard),
        (status = 401, description = "Missing or wrong admin token"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn dashboard(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let dashboard = blocking(&state, |s| s.dashboard.dashboard(Utc::now())).await?;
    Ok(ok(dashboard))
}

#[utoipa::path(
    get,
    path = "/admin/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("search" = Option<String>, Query, description = "Matches email, first or last name"),
    ),
    responses((status = 200, description = "Customers with order totals", body = [CustomerSummary])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn customers(
    state: web::Data<AppState>,
    query: web::Query<CustomerQuery>,
) -> Result<HttpResponse, AppError> {
    let CustomerQuery { page, limit, search } = query.into_inner();
    let paging = PageParams { page, limit }.paging();
    let (customers, total) = blocking(&state, move |s| s.dashboard.customers(search.as_deref(), paging)).await?;
    Ok(ok(Page::new(customers, total, paging)))
}
