//! Host CMS user directory adapters.
//!
//! The billing service shares a database with the host CMS; the production
//! directory reads the host's user table directly. A static directory is
//! provided for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{HostUser, UserDirectory};

/// User directory backed by the host CMS user table.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a host user.
#[derive(Debug, sqlx::FromRow)]
struct HostUserRow {
    id: i64,
    email: String,
    display_name: Option<String>,
}

impl TryFrom<HostUserRow> for HostUser {
    type Error = DomainError;

    fn try_from(row: HostUserRow) -> Result<Self, Self::Error> {
        let id = UserId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user id: {}", e))
        })?;

        Ok(HostUser {
            id,
            email: row.email,
            display_name: row.display_name,
        })
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, user_id: UserId) -> Result<Option<HostUser>, DomainError> {
        let row: Option<HostUserRow> = sqlx::query_as(
            r#"
            SELECT id, email, display_name
            FROM host_users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find user: {}", e))
        })?;

        row.map(HostUser::try_from).transpose()
    }
}

/// Static user directory for tests and local development.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
#[derive(Default)]
pub struct StaticUserDirectory {
    users: RwLock<HashMap<i64, HostUser>>,
}

impl StaticUserDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user to the directory.
    pub fn with_user(self, user: HostUser) -> Self {
        self.users
            .write()
            .expect("StaticUserDirectory: lock poisoned")
            .insert(user.id.as_i64(), user);
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn find_user(&self, user_id: UserId) -> Result<Option<HostUser>, DomainError> {
        Ok(self
            .users
            .read()
            .expect("StaticUserDirectory: lock poisoned")
            .get(&user_id.as_i64())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_finds_seeded_user() {
        let directory = StaticUserDirectory::new().with_user(HostUser {
            id: UserId::new(5).unwrap(),
            email: "five@example.com".to_string(),
            display_name: None,
        });

        let found = directory
            .find_user(UserId::new(5).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.email, "five@example.com");

        let missing = directory.find_user(UserId::new(6).unwrap()).await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn host_user_row_rejects_non_positive_id() {
        let row = HostUserRow {
            id: -3,
            email: "x@example.com".to_string(),
            display_name: None,
        };

        assert!(HostUser::try_from(row).is_err());
    }
}
