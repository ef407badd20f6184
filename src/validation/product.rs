use garde::Validate;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::product::{PRICE_NOT_A_NUMBER, Product, ProductInput};

/// Raw product form fields as submitted by the browser.
///
/// Numbers arrive as text so a typo re-renders the form instead of failing
/// extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
        }
    }
}

fn message_for(field: &str, detail: &str) -> Option<&'static str> {
    match field {
        "price" if detail == PRICE_NOT_A_NUMBER => Some(PRICE_NOT_A_NUMBER),
        "name" => Some("Name is required and must be at most 255 characters."),
        "description" => Some("Description must be at most 2000 characters."),
        "price" => Some("Price must be zero or greater."),
        "stock" => Some("Stock must be zero or greater."),
        _ => None,
    }
}

/// Parses and validates a product form.
///
/// Name and description are trimmed; an empty stock field means 0.
pub fn parse_product(form: &ProductForm) -> Result<ProductInput> {
    let price: f64 = form
        .price
        .trim()
        .parse()
        .map_err(|_| AppError::validation("price", PRICE_NOT_A_NUMBER))?;

    let stock_text = form.stock.trim();
    let stock: i32 = if stock_text.is_empty() {
        0
    } else {
        stock_text
            .parse()
            .map_err(|_| AppError::validation("stock", "Stock must be a whole number."))?
    };

    let input = ProductInput {
        name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
        price,
        stock,
    };

    validate_product(&input)?;
    Ok(input)
}

/// Checks the domain rules on an already parsed product.
pub fn validate_product(input: &ProductInput) -> Result<()> {
    input.validate().map_err(|report| {
        let (field, detail) = report
            .iter()
            .next()
            .map(|(path, error)| (path.to_string(), error.to_string()))
            .unwrap_or_else(|| ("input".to_string(), "invalid input".to_string()));
        let message = message_for(&field, &detail)
            .map(str::to_string)
            .unwrap_or(detail);
        AppError::Validation { field, message }
    })
}
