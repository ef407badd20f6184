use tokio_postgres::Row;

/// Represents a registered user.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i32,
    /// The user's email address, unique and case-sensitive as stored.
    pub email: String,
    /// The user's PHC-format password hash. `None` only for a corrupt row.
    pub password_hash: Option<String>,
}

impl TryFrom<&Row> for User {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
        })
    }
}
