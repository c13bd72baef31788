use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::review::{Review, ReviewInput, ReviewStats};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, created, done, ok, require_customer, Page, PageParams};

#[derive(Debug, Deserialize)]
pub struct AdminReviewParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub approved: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses((status = 200, description = "Approved reviews, newest first", body = [Review])),
    tag = "reviews"
)]
pub async fn product_reviews(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let reviews = blocking(&state, move |s| s.reviews.product_reviews(product_id)).await?;
    Ok(ok(reviews))
}

#[utoipa::path(
    get,
    path = "/products/{id}/reviews/stats",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses((status = 200, description = "Average and rating distribution", body = ReviewStats)),
    tag = "reviews"
)]
pub async fn review_stats(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let stats = blocking(&state, move |s| s.reviews.stats(product_id)).await?;
    Ok(ok(stats))
}

/// POST /products/{id}/reviews
///
/// New reviews wait for moderation before they are shown.
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
        ("X-Customer-Id" = Uuid, Header, description = "Reviewing customer"),
    ),
    request_body = ReviewInput,
    responses(
        (status = 201, description = "Review submitted", body = Review),
        (status = 400, description = "Invalid rating or content"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Already reviewed"),
    ),
    tag = "reviews"
)]
pub async fn create_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    let customer = require_customer(&req)?;
    let product_id = path.into_inner();
    let input = body.into_inner();
    let review = blocking(&state, move |s| s.reviews.create(product_id, customer, input)).await?;
    Ok(created(review))
}

#[utoipa::path(
    put,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review UUID")),
    request_body = ReviewInput,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 403, description = "Review belongs to another customer"),
        (status = 404, description = "Review not found"),
    ),
    tag = "reviews"
)]
pub async fn update_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    let customer = require_customer(&req)?;
    let id = path.into_inner();
    let input = body.into_inner();
    let review = blocking(&state, move |s| s.reviews.update(id, customer, input)).await?;
    Ok(ok(review))
}

#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review UUID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Review belongs to another customer"),
        (status = 404, description = "Review not found"),
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer = require_customer(&req)?;
    let id = path.into_inner();
    blocking(&state, move |s| s.reviews.delete(id, customer)).await?;
    Ok(done("Review deleted"))
}

// ── Moderation ───────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/reviews",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("approved" = Option<bool>, Query, description = "Filter by moderation state"),
    ),
    responses((status = 200, description = "Reviews, newest first", body = [Review])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn admin_list_reviews(
    state: web::Data<AppState>,
    query: web::Query<AdminReviewParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let paging = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .paging();
    let approved = params.approved;
    let (reviews, total) = blocking(&state, move |s| s.reviews.list(approved, paging)).await?;
    Ok(ok(Page::new(reviews, total, paging)))
}

#[utoipa::path(
    post,
    path = "/admin/reviews/{id}/approve",
    params(("id" = Uuid, Path, description = "Review UUID")),
    responses(
        (status = 200, description = "Review published"),
        (status = 404, description = "Review not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn approve_review(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(&state, move |s| s.reviews.approve(id)).await?;
    Ok(done("Review approved"))
}

#[utoipa::path(
    delete,
    path = "/admin/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review UUID")),
    responses(
        (status = 200, description = "Review rejected and removed"),
        (status = 404, description = "Review not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn reject_review(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(&state, move |s| s.reviews.reject(id)).await?;
    Ok(done("Review rejected"))
}
