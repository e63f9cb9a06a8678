//! Errors raised by storage, configuration and export/import

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or image directory access
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export document that is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreadable or malformed `config.toml`
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected value, such as an unknown status name
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for a UNIQUE constraint failure (duplicate category name)
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let pool = crate::db::init_memory_database().await.unwrap();
        sqlx::query("INSERT INTO ingredient_categories (name) VALUES ('Props')")
            .execute(&pool)
            .await
            .unwrap();

        let err: Error = sqlx::query("INSERT INTO ingredient_categories (name) VALUES ('Props')")
            .execute(&pool)
            .await
            .unwrap_err()
            .into();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn test_other_errors_are_not_unique_violations() {
        assert!(!Error::Config("bad port".into()).is_unique_violation());
        assert!(!Error::InvalidInput("sleeping".into()).is_unique_violation());
    }
}
