use crate::{
    error::{AppError, Result},
    models::{
        product::{Product, ProductInput},
        session::Session,
    },
    repositories::product::ProductRepository,
    validation::product::validate_product,
};

fn normalize(input: ProductInput) -> Result<ProductInput> {
    let input = ProductInput {
        name: input.name.trim().to_string(),
        description: input.description.trim().to_string(),
        ..input
    };
    validate_product(&input)?;
    Ok(input)
}

/// Lists products, filtered by substring when `query` has non-blank text.
pub async fn list_products(
    products: &dyn ProductRepository,
    query: Option<&str>,
) -> Result<Vec<Product>> {
    let filter = query.map(str::trim).filter(|q| !q.is_empty());
    products.list(filter).await
}

pub async fn get_product(products: &dyn ProductRepository, id: i32) -> Result<Product> {
    products.find(id).await?.ok_or(AppError::NotFound)
}

/// Creates a product on behalf of `actor`.
///
/// Invalid input is rejected before anything is written.
pub async fn create_product(
    products: &dyn ProductRepository,
    input: ProductInput,
    actor: &Session,
) -> Result<Product> {
    let input = normalize(input)?;

    let product = products.create(&input).await.inspect_err(|e| {
        tracing::error!(
            "❌ Creating product {:?} for {} failed, rolled back: {}",
            input.name,
            actor.email,
            e
        )
    })?;

    tracing::info!(
        "✅ Product {} ({:?}) created by {}",
        product.id,
        product.name,
        actor.email
    );
    Ok(product)
}

/// Replaces the editable fields of product `id` on behalf of `actor`.
///
/// A missing `id` is reported as `NotFound` before the input is checked.
pub async fn update_product(
    products: &dyn ProductRepository,
    id: i32,
    input: ProductInput,
    actor: &Session,
) -> Result<Product> {
    get_product(products, id).await?;
    let input = normalize(input)?;

    let product = products
        .update(id, &input)
        .await
        .inspect_err(|e| {
            tracing::error!(
                "❌ Updating product {} for {} failed, rolled back: {}",
                id,
                actor.email,
                e
            )
        })?
        .ok_or(AppError::NotFound)?;

    tracing::info!("✅ Product {} updated by {}", product.id, actor.email);
    Ok(product)
}

/// Permanently deletes product `id`, returning its name for the audit log.
pub async fn delete_product(
    products: &dyn ProductRepository,
    id: i32,
    actor: &Session,
) -> Result<String> {
    let product = products
        .delete(id)
        .await
        .inspect_err(|e| {
            tracing::error!(
                "❌ Deleting product {} for {} failed, rolled back: {}",
                id,
                actor.email,
                e
            )
        })?
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        "🗑️ Product {} ({:?}) deleted by {}",
        product.id,
        product.name,
        actor.email
    );
    Ok(product.name)
}
