use garde::Validate;
use serde::Serialize;
use tokio_postgres::Row;

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// System-assigned, immutable identifier.
    pub id: i32,
    /// The product name, trimmed and non-empty.
    pub name: String,
    /// The product description, trimmed.
    pub description: String,
    /// The unit price, never negative.
    pub price: f64,
    /// Units in stock, never negative.
    pub stock: i32,
}

/// The caller-editable fields of a product, already trimmed and parsed.
///
/// The same rules apply on create and on update.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductInput {
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
    #[garde(length(chars, max = 2000))]
    pub description: String,
    #[garde(custom(finite_price), range(min = 0.0))]
    pub price: f64,
    #[garde(range(min = 0))]
    pub stock: i32,
}

/// Reported when a price is NaN or infinite.
pub const PRICE_NOT_A_NUMBER: &str = "Price must be a number.";

// `range` lets NaN through since every comparison with it is false.
fn finite_price(value: &f64, _ctx: &()) -> garde::Result {
    if value.is_finite() {
        Ok(())
    } else {
        Err(garde::Error::new(PRICE_NOT_A_NUMBER))
    }
}

impl Product {
    /// The price as shown to shoppers.
    pub fn price_display(&self) -> String {
        format!("{:.2}", self.price)
    }
}

impl TryFrom<&Row> for Product {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
        })
    }
}
