use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartView;
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, cart_owner, ok, require_customer, session_id, SESSION_HEADER};

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// GET /cart
///
/// Creates the cart on first access. Totals are recomputed from current prices.
#[utoipa::path(
    get,
    path = "/cart",
    params(
        ("X-Customer-Id" = Option<Uuid>, Header, description = "Logged-in customer"),
        ("X-Session-Id" = Option<String>, Header, description = "Anonymous session"),
    ),
    responses(
        (status = 200, description = "Current cart", body = CartView),
        (status = 400, description = "Neither header present"),
    ),
    tag = "cart"
)]
pub async fn get_cart(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let owner = cart_owner(&req)?;
    let cart = blocking(&state, move |s| s.carts.view(&owner)).await?;
    Ok(ok(cart))
}

#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added", body = CartView),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let owner = cart_owner(&req)?;
    let AddItemRequest { product_id, quantity } = body.into_inner();
    let cart = blocking(&state, move |s| s.carts.add_item(&owner, product_id, quantity)).await?;
    Ok(ok(cart))
}

/// PUT /cart/items/{item_id}
///
/// A quantity of zero or less removes the line.
#[utoipa::path(
    put,
    path = "/cart/items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Cart line UUID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Line updated", body = CartView),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "cart"
)]
pub async fn update_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let owner = cart_owner(&req)?;
    let item_id = path.into_inner();
    let quantity = body.quantity;
    let cart = blocking(&state, move |s| s.carts.update_item(&owner, item_id, quantity)).await?;
    Ok(ok(cart))
}

#[utoipa::path(
    delete,
    path = "/cart/items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Cart line UUID")),
    responses(
        (status = 200, description = "Line removed", body = CartView),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let owner = cart_owner(&req)?;
    let item_id = path.into_inner();
    let cart = blocking(&state, move |s| s.carts.remove_item(&owner, item_id)).await?;
    Ok(ok(cart))
}

#[utoipa::path(
    delete,
    path = "/cart",
    responses((status = 200, description = "Cart emptied", body = CartView)),
    tag = "cart"
)]
pub async fn clear_cart(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let owner = cart_owner(&req)?;
    let cart = blocking(&state, move |s| s.carts.clear(&owner)).await?;
    Ok(ok(cart))
}

/// POST /cart/merge
///
/// Called right after login: folds the anonymous session cart into the
/// customer's cart.
#[utoipa::path(
    post,
    path = "/cart/merge",
    params(
        ("X-Customer-Id" = Uuid, Header, description = "Customer who just logged in"),
        ("X-Session-Id" = String, Header, description = "Session that owned the anonymous cart"),
    ),
    responses(
        (status = 200, description = "Merged customer cart", body = CartView),
        (status = 400, description = "Missing header"),
    ),
    tag = "cart"
)]
pub async fn merge_cart(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let customer_id = require_customer(&req)?;
    let session =
        session_id(&req).ok_or_else(|| AppError::BadRequest(format!("{SESSION_HEADER} header is required")))?;
    let cart = blocking(&state, move |s| s.carts.merge(&session, customer_id)).await?;
    Ok(ok(cart))
}
