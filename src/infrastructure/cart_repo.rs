use chrono::{DateTime, Utc};
use diesel::pg::upsert::excluded;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartLine, CartOwner};
use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, WishlistRepository};
use crate::domain::wishlist::WishlistEntry;
use crate::schema::{cart_items, carts, products, wishlist_items};

use super::models::{CartItemRow, CartRow, NewCartItemRow, NewCartRow, NewWishlistItemRow, ProductRow};

/// Carts and wishlists share this repository; both are per-shopper lists
/// of products.
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn cart_of(conn: &mut PgConnection, owner: &CartOwner) -> QueryResult<Option<CartRow>> {
    let query = carts::table.select(CartRow::as_select());
    match owner {
        CartOwner::Customer(id) => query.filter(carts::customer_id.eq(*id)).first(conn).optional(),
        CartOwner::Session(session) => query
            .filter(carts::session_id.eq(session))
            .first(conn)
            .optional(),
    }
}

/// Looks the cart up, creating it when missing. A concurrent insert for the
/// same owner is absorbed by the unique constraint.
fn ensure_cart(conn: &mut PgConnection, owner: &CartOwner) -> Result<CartRow, DomainError> {
    if let Some(cart) = cart_of(conn, owner)? {
        return Ok(cart);
    }
    let (customer_id, session_id) = match owner {
        CartOwner::Customer(id) => (Some(*id), None),
        CartOwner::Session(session) => (None, Some(session.clone())),
    };
    diesel::insert_into(carts::table)
        .values(&NewCartRow {
            id: Uuid::new_v4(),
            customer_id,
            session_id,
        })
        .on_conflict_do_nothing()
        .execute(conn)?;
    cart_of(conn, owner)?.ok_or_else(|| DomainError::Internal("cart vanished after insert".into()))
}

fn lines_where(
    conn: &mut PgConnection,
    cart_id: Uuid,
    item: Option<Uuid>,
    product: Option<Uuid>,
) -> Result<Vec<CartLine>, DomainError> {
    let mut query = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::cart_id.eq(cart_id))
        .select((CartItemRow::as_select(), ProductRow::as_select()))
        .order(cart_items::created_at.asc())
        .into_boxed();
    if let Some(item_id) = item {
        query = query.filter(cart_items::id.eq(item_id));
    }
    if let Some(product_id) = product {
        query = query.filter(cart_items::product_id.eq(product_id));
    }
    let rows: Vec<(CartItemRow, ProductRow)> = query.load(conn)?;
    rows.into_iter()
        .map(|(item, product)| {
            Ok(CartLine {
                id: item.id,
                quantity: item.quantity,
                product: Product::try_from(product)?,
            })
        })
        .collect()
}

fn touch(conn: &mut PgConnection, cart_id: Uuid) -> QueryResult<usize> {
    diesel::update(carts::table.find(cart_id))
        .set(carts::updated_at.eq(Utc::now()))
        .execute(conn)
}

impl CartRepository for DieselCartRepository {
    fn find_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(cart_of(&mut conn, owner)?.map(Cart::from))
    }

    fn find_or_create_cart(&self, owner: &CartOwner) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(ensure_cart(&mut conn, owner)?.into())
    }

    fn cart_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        lines_where(&mut conn, cart_id, None, None)
    }

    fn line_for_product(&self, cart_id: Uuid, product_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(lines_where(&mut conn, cart_id, None, Some(product_id))?.into_iter().next())
    }

    fn line(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(lines_where(&mut conn, cart_id, Some(item_id), None)?.into_iter().next())
    }

    fn put_line(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(cart_items::table)
                .values(&NewCartItemRow {
                    id: Uuid::new_v4(),
                    cart_id,
                    product_id,
                    quantity,
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set(cart_items::quantity.eq(excluded(cart_items::quantity)))
                .execute(conn)?;
            touch(conn, cart_id)?;
            Ok(())
        })
    }

    fn remove_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .filter(cart_items::id.eq(item_id)),
        )
        .execute(&mut conn)?;
        if deleted > 0 {
            touch(&mut conn, cart_id)?;
        }
        Ok(deleted > 0)
    }

    fn clear_cart(&self, cart_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id))).execute(&mut conn)?;
        touch(&mut conn, cart_id)?;
        Ok(())
    }

    fn merge_carts(&self, session_id: &str, customer_id: Uuid) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let target = ensure_cart(conn, &CartOwner::Customer(customer_id))?;
            let Some(source) = cart_of(conn, &CartOwner::Session(session_id.to_string()))? else {
                return Ok(target.into());
            };
            if source.id == target.id {
                return Ok(target.into());
            }

            let moved: Vec<(Uuid, i32)> = cart_items::table
                .filter(cart_items::cart_id.eq(source.id))
                .select((cart_items::product_id, cart_items::quantity))
                .load(conn)?;
            for (product_id, quantity) in moved {
                diesel::insert_into(cart_items::table)
                    .values(&NewCartItemRow {
                        id: Uuid::new_v4(),
                        cart_id: target.id,
                        product_id,
                        quantity,
                    })
                    .on_conflict((cart_items::cart_id, cart_items::product_id))
                    .do_update()
                    .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
                    .execute(conn)?;
            }
            diesel::delete(carts::table.find(source.id)).execute(conn)?;
            touch(conn, target.id)?;
            log::debug!("merged session cart {} into cart {}", source.id, target.id);
            Ok(target.into())
        })
    }
}

impl WishlistRepository for DieselCartRepository {
    fn wishlist(&self, customer_id: Uuid) -> Result<Vec<WishlistEntry>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(ProductRow, DateTime<Utc>)> = wishlist_items::table
            .inner_join(products::table)
            .filter(wishlist_items::customer_id.eq(customer_id))
            .select((ProductRow::as_select(), wishlist_items::added_at))
            .order(wishlist_items::added_at.desc())
            .load(&mut conn)?;
        rows.into_iter()
            .map(|(product, added_at)| {
                Ok(WishlistEntry {
                    product: Product::try_from(product)?,
                    added_at,
                })
            })
            .collect()
    }

    fn add_to_wishlist(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let inserted = diesel::insert_into(wishlist_items::table)
            .values(&NewWishlistItemRow {
                id: Uuid::new_v4(),
                customer_id,
                product_id,
            })
            .on_conflict((wishlist_items::customer_id, wishlist_items::product_id))
            .do_nothing()
            .execute(&mut conn)?;
        Ok(inserted > 0)
    }

    fn remove_from_wishlist(&self, customer_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            wishlist_items::table
                .filter(wishlist_items::customer_id.eq(customer_id))
                .filter(wishlist_items::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
