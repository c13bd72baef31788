use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ShippingRepository;
use crate::domain::shipping::{PaymentMethod, ShippingMethod};
use crate::schema::{payment_methods, shipping_methods};

use super::models::{PaymentMethodRow, ShippingMethodRow};

pub struct DieselShippingRepository {
    pool: DbPool,
}

impl DieselShippingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ShippingRepository for DieselShippingRepository {
    fn shipping_methods(&self) -> Result<Vec<ShippingMethod>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = shipping_methods::table
            .select(ShippingMethodRow::as_select())
            .order((shipping_methods::sort_order.asc(), shipping_methods::code.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ShippingMethod::from).collect())
    }

    fn shipping_method(&self, id: Uuid) -> Result<Option<ShippingMethod>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = shipping_methods::table
            .find(id)
            .select(ShippingMethodRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(ShippingMethod::from))
    }

    fn payment_methods(&self) -> Result<Vec<PaymentMethod>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = payment_methods::table
            .select(PaymentMethodRow::as_select())
            .order((payment_methods::sort_order.asc(), payment_methods::code.asc()))
            .load(&mut conn)?;
        rows.into_iter().map(PaymentMethod::try_from).collect()
    }

    fn payment_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError> {
        let mut conn = self.pool.get()?;
        payment_methods::table
            .find(id)
            .select(PaymentMethodRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PaymentMethod::try_from)
            .transpose()
    }
}
