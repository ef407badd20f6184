use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::Result,
    models::product::{Product, ProductInput},
};

/// Persistence for catalog products.
///
/// Listing order is ascending id. Updates carry no version check, so two
/// concurrent updates of one product resolve as last writer wins.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Lists products, optionally only those whose name or description
    /// contains `filter` (case-sensitive).
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Product>>;

    async fn find(&self, id: i32) -> Result<Option<Product>>;

    async fn create(&self, input: &ProductInput) -> Result<Product>;

    /// Replaces the editable fields. `None` when no product has `id`.
    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>>;

    /// Removes a product permanently, returning what was removed.
    async fn delete(&self, id: i32) -> Result<Option<Product>>;

    async fn count(&self) -> Result<usize>;
}

/// `ProductRepository` backed by PostgreSQL.
///
/// Every mutation runs in its own transaction. An error before `commit`
/// drops the transaction, which rolls it back.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: Pool,
}

impl PgProductRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Product>> {
        let client = self.pool.get().await?;
        let rows = match filter {
            Some(needle) => {
                let stmt = client
                    .prepare_cached(
                        r#"
                        SELECT id, name, description, price, stock
                        FROM products
                        WHERE strpos(name, $1) > 0 OR strpos(description, $1) > 0
                        ORDER BY id
                        "#,
                    )
                    .await?;
                client.query(&stmt, &[&needle]).await?
            }
            None => {
                let stmt = client
                    .prepare_cached(
                        "SELECT id, name, description, price, stock FROM products ORDER BY id",
                    )
                    .await?;
                client.query(&stmt, &[]).await?
            }
        };

        Ok(rows
            .iter()
            .map(Product::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn find(&self, id: i32) -> Result<Option<Product>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached("SELECT id, name, description, price, stock FROM products WHERE id = $1")
            .await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        Ok(row.as_ref().map(Product::try_from).transpose()?)
    }

    async fn create(&self, input: &ProductInput) -> Result<Product> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let stmt = tx
            .prepare_cached(
                r#"
                INSERT INTO products (name, description, price, stock)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, description, price, stock
                "#,
            )
            .await?;
        let row = tx
            .query_one(
                &stmt,
                &[&input.name, &input.description, &input.price, &input.stock],
            )
            .await?;
        let product = Product::try_from(&row)?;
        tx.commit().await?;
        Ok(product)
    }

    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let stmt = tx
            .prepare_cached(
                r#"
                UPDATE products
                SET name = $1, description = $2, price = $3, stock = $4
                WHERE id = $5
                RETURNING id, name, description, price, stock
                "#,
            )
            .await?;
        let row = tx
            .query_opt(
                &stmt,
                &[&input.name, &input.description, &input.price, &input.stock, &id],
            )
            .await?;
        let product = row.as_ref().map(Product::try_from).transpose()?;
        tx.commit().await?;
        Ok(product)
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let stmt = tx
            .prepare_cached(
                "DELETE FROM products WHERE id = $1 RETURNING id, name, description, price, stock",
            )
            .await?;
        let row = tx.query_opt(&stmt, &[&id]).await?;
        let product = row.as_ref().map(Product::try_from).transpose()?;
        tx.commit().await?;
        Ok(product)
    }

    async fn count(&self) -> Result<usize> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached("SELECT COUNT(*) FROM products").await?;
        let count: i64 = client.query_one(&stmt, &[]).await?.try_get(0)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
