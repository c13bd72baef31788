use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::cms::{Banner, BannerInput, ContentBlock, ContentBlockInput, Homepage, HomepageSection, SectionInput};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, created, done, ok};

#[derive(Debug, Deserialize)]
pub struct PlacementQuery {
    pub placement: Option<String>,
}

// ── Storefront ───────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/cms/homepage",
    responses((status = 200, description = "Active sections and content blocks by key", body = Homepage)),
    tag = "cms"
)]
pub async fn homepage(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let page = blocking(&state, |s| s.cms.homepage()).await?;
    Ok(ok(page))
}

#[utoipa::path(
    get,
    path = "/cms/banners",
    params(("placement" = Option<String>, Query, description = "e.g. homepage_hero")),
    responses((status = 200, description = "Banners live right now", body = [Banner])),
    tag = "cms"
)]
pub async fn live_banners(
    state: web::Data<AppState>,
    query: web::Query<PlacementQuery>,
) -> Result<HttpResponse, AppError> {
    let placement = query.into_inner().placement;
    let banners = blocking(&state, move |s| s.cms.live_banners(placement.as_deref(), Utc::now())).await?;
    Ok(ok(banners))
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/cms/sections",
    responses((status = 200, description = "All sections", body = [HomepageSection])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn list_sections(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let sections = blocking(&state, |s| s.cms.sections()).await?;
    Ok(ok(sections))
}

#[utoipa::path(
    post,
    path = "/admin/cms/sections",
    request_body = SectionInput,
    responses(
        (status = 201, description = "Section created", body = HomepageSection),
        (status = 409, description = "Section key already exists"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn create_section(state: web::Data<AppState>, body: web::Json<SectionInput>) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let section = blocking(&state, move |s| s.cms.create_section(input)).await?;
    Ok(created(section))
}

#[utoipa::path(
    put,
    path = "/admin/cms/sections/{id}",
    params(("id" = Uuid, Path, description = "Section UUID")),
    request_body = SectionInput,
    responses(
        (status = 200, description = "Section replaced", body = HomepageSection),
        (status = 404, description = "Section not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn update_section(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SectionInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner();
    let section = blocking(&state, move |s| s.cms.update_section(id, input)).await?;
    Ok(ok(section))
}

#[utoipa::path(
    delete,
    path = "/admin/cms/sections/{id}",
    params(("id" = Uuid, Path, description = "Section UUID")),
    responses(
        (status = 200, description = "Section deleted"),
        (status = 404, description = "Section not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn delete_section(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(&state, move |s| s.cms.delete_section(id)).await?;
    Ok(done("Section deleted"))
}

// ── Banners ──────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/cms/banners",
    responses((status = 200, description = "All banners, scheduled or not", body = [Banner])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn list_banners(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let banners = blocking(&state, |s| s.cms.banners()).await?;
    Ok(ok(banners))
}

#[utoipa::path(
    post,
    path = "/admin/cms/banners",
    request_body = BannerInput,
    responses(
        (status = 201, description = "Banner created", body = Banner),
        (status = 400, description = "Invalid banner"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn create_banner(state: web::Data<AppState>, body: web::Json<BannerInput>) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let banner = blocking(&state, move |s| s.cms.create_banner(input)).await?;
    Ok(created(banner))
}

#[utoipa::path(
    put,
    path = "/admin/cms/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner UUID")),
    request_body = BannerInput,
    responses(
        (status = 200, description = "Banner replaced", body = Banner),
        (status = 404, description = "Banner not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn update_banner(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<BannerInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner();
    let banner = blocking(&state, move |s| s.cms.update_banner(id, input)).await?;
    Ok(ok(banner))
}

#[utoipa::path(
    delete,
    path = "/admin/cms/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner UUID")),
    responses(
        (status = 200, description = "Banner deleted"),
        (status = 404, description = "Banner not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn delete_banner(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(&state, move |s| s.cms.delete_banner(id)).await?;
    Ok(done("Banner deleted"))
}

// ── Content blocks ───────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/cms/blocks",
    responses((status = 200, description = "All content blocks", body = [ContentBlock])),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn list_blocks(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let blocks = blocking(&state, |s| s.cms.content_blocks()).await?;
    Ok(ok(blocks))
}

/// PUT /admin/cms/blocks/{key}
///
/// Creates the block or replaces its content; the id stays stable.
#[utoipa::path(
    put,
    path = "/admin/cms/blocks/{key}",
    params(("key" = String, Path, description = "Block key")),
    request_body = ContentBlockInput,
    responses((status = 200, description = "Block stored", body = ContentBlock)),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn upsert_block(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ContentBlockInput>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    let input = body.into_inner();
    let block = blocking(&state, move |s| s.cms.upsert_content_block(&key, input)).await?;
    Ok(ok(block))
}

#[utoipa::path(
    delete,
    path = "/admin/cms/blocks/{key}",
    params(("key" = String, Path, description = "Block key")),
    responses(
        (status = 200, description = "Block deleted"),
        (status = 404, description = "Content block not found"),
    ),
    security(("admin_token" = [])),
    tag = "admin"
)]
pub async fn delete_block(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    blocking(&state, move |s| s.cms.delete_content_block(&key)).await?;
    Ok(done("Content block deleted"))
}
