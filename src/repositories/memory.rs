use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::{
        product::{Product, ProductInput},
        user::User,
    },
    repositories::{product::ProductRepository, user::UserRepository},
};

/// In-process `UserRepository`, keyed by email.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a user row verbatim, hash included. Used to seed accounts whose
    /// stored credential did not come from `create`.
    pub async fn insert_raw(&self, email: &str, password_hash: Option<String>) -> User {
        let mut users = self.users.write().await;
        let user = User {
            id: next_user_id(&users),
            email: email.to_string(),
            password_hash,
        };
        users.insert(email.to_string(), user.clone());
        user
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

fn next_user_id(users: &HashMap<String, User>) -> i32 {
    users.values().map(|u| u.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AppError::EmailTaken);
        }
        let user = User {
            id: next_user_id(&users),
            email: email.to_string(),
            password_hash: Some(password_hash.to_string()),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
struct ProductTable {
    rows: BTreeMap<i32, Product>,
    last_id: i32,
}

/// In-process `ProductRepository`. Ids are never reused, like a sequence.
#[derive(Default)]
pub struct MemoryProductRepository {
    table: RwLock<ProductTable>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(product: &Product, needle: &str) -> bool {
    product.name.contains(needle) || product.description.contains(needle)
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Product>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|p| filter.is_none_or(|needle| matches(p, needle)))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, input: &ProductInput) -> Result<Product> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let product = Product {
            id: table.last_id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            stock: input.stock,
        };
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|product| {
            product.name = input.name.clone();
            product.description = input.description.clone();
            product.price = input.price;
            product.stock = input.stock;
            product.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.table.write().await.rows.remove(&id))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.read().await.rows.len())
    }
}
