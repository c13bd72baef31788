use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::state::AppState;

use super::blocking;

const FEED_MAX_AGE_SECS: u32 = 7200;

/// GET /feeds/heureka.xml
///
/// Heureka product feed of in-stock active products.
#[utoipa::path(
    get,
    path = "/feeds/heureka.xml",
    responses((status = 200, description = "Heureka XML feed", body = String, content_type = "application/xml")),
    tag = "feeds"
)]
pub async fn heureka(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let xml = blocking(&state, |s| s.catalog.heureka_feed(&s.store_url)).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(FEED_MAX_AGE_SECS),
        ]))
        .body(xml))
}
