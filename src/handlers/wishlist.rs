use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::domain::wishlist::{WishlistEntry, WishlistRequest, WishlistToggle};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, done, ok, require_customer};

#[utoipa::path(
    get,
    path = "/wishlist",
    params(("X-Customer-Id" = Uuid, Header, description = "Logged-in customer")),
    responses(
        (status = 200, description = "Saved products, newest first", body = [WishlistEntry]),
        (status = 400, description = "Login required"),
    ),
    tag = "wishlist"
)]
pub async fn list_wishlist(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let customer_id = require_customer(&req)?;
    let entries = blocking(&state, move |s| s.wishlist.list(customer_id)).await?;
    Ok(ok(entries))
}

#[utoipa::path(
    post,
    path = "/wishlist",
    request_body = WishlistRequest,
    responses(
        (status = 200, description = "Product saved"),
        (status = 404, description = "Product not found"),
    ),
    tag = "wishlist"
)]
pub async fn add_to_wishlist(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<WishlistRequest>,
) -> Result<HttpResponse, AppError> {
    let customer_id = require_customer(&req)?;
    let product_id = body.product_id;
    blocking(&state, move |s| s.wishlist.add(customer_id, product_id)).await?;
    Ok(done("Added to wishlist"))
}

#[utoipa::path(
    delete,
    path = "/wishlist/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses((status = 200, description = "Product removed")),
    tag = "wishlist"
)]
pub async fn remove_from_wishlist(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer_id = require_customer(&req)?;
    let product_id = path.into_inner();
    blocking(&state, move |s| s.wishlist.remove(customer_id, product_id)).await?;
    Ok(done("Removed from wishlist"))
}

#[utoipa::path(
    post,
    path = "/wishlist/toggle",
    request_body = WishlistRequest,
    responses((status = 200, description = "Whether the product is now saved", body = WishlistToggle)),
    tag = "wishlist"
)]
pub async fn toggle_wishlist(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<WishlistRequest>,
) -> Result<HttpResponse, AppError> {
    let customer_id = require_customer(&req)?;
    let product_id = body.product_id;
    let toggle = blocking(&state, move |s| s.wishlist.toggle(customer_id, product_id)).await?;
    Ok(ok(toggle))
}
