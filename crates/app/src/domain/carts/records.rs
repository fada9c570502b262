//! Cart Records

use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow};
use trolley::{items::CartLineItem, products::ProductId};

/// A cart line joined against its product.
#[derive(Debug, Clone)]
pub(crate) struct CartLineRecord {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub name: String,
    pub image: Option<String>,
    pub in_stock: bool,
}

impl From<CartLineRecord> for CartLineItem {
    fn from(record: CartLineRecord) -> Self {
        Self {
            product_id: record.product_id,
            quantity: record.quantity,
            unit_price: record.unit_price,
            name: record.name,
            image: record.image,
            in_stock: record.in_stock,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for CartLineRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i64 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity,
            unit_price: row.try_get("unit_price")?,
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            in_stock: row.try_get("in_stock")?,
        })
    }
}
