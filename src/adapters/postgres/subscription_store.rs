//! PostgreSQL implementation of SubscriptionStore.
//!
//! Persists identity links and pending checkout sessions using PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::{IdentityLink, PendingCheckoutSession, PendingSessionFilter};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::SubscriptionStore;

/// PostgreSQL implementation of the SubscriptionStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an identity link.
#[derive(Debug, sqlx::FromRow)]
struct IdentityLinkRow {
    user_id: i64,
    customer_id: Option<String>,
    subscription_id: Option<String>,
}

impl TryFrom<IdentityLinkRow> for IdentityLink {
    type Error = DomainError;

    fn try_from(row: IdentityLinkRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
        })?;

        Ok(IdentityLink {
            user_id,
            customer_id: row.customer_id,
            subscription_id: row.subscription_id,
        })
    }
}

/// Database row representation of a pending checkout session.
#[derive(Debug, sqlx::FromRow)]
struct PendingSessionRow {
    user_id: i64,
    session_id: String,
    product_id: String,
    payment_term: String,
    quantity: i32,
}

impl TryFrom<PendingSessionRow> for PendingCheckoutSession {
    type Error = DomainError;

    fn try_from(row: PendingSessionRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
        })?;

        let quantity = u32::try_from(row.quantity).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid quantity value: {}", row.quantity),
            )
        })?;

        Ok(PendingCheckoutSession {
            user_id,
            session_id: row.session_id,
            product_id: row.product_id,
            payment_term: row.payment_term,
            quantity,
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn find_identity_link(&self, user_id: UserId) -> Result<Option<IdentityLink>, DomainError> {
        let row: Option<IdentityLinkRow> = sqlx::query_as(
            r#"
            SELECT user_id, customer_id, subscription_id
            FROM billing_identity_links
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find identity link", e))?;

        row.map(IdentityLink::try_from).transpose()
    }

    async fn insert_identity_link(&self, link: &IdentityLink) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO billing_identity_links (user_id, customer_id, subscription_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(link.user_id.as_i64())
        .bind(&link.customer_id)
        .bind(&link.subscription_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("billing_identity_links_pkey") {
                    return DomainError::new(
                        ErrorCode::DatabaseError,
                        "User already has an identity link",
                    );
                }
            }
            db_error("Failed to insert identity link", e)
        })?;

        Ok(())
    }

    async fn set_subscription_id(
        &self,
        user_id: UserId,
        subscription_id: Option<String>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE billing_identity_links
            SET subscription_id = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(&subscription_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update subscription id", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::IdentityLinkNotFound,
                "Identity link not found",
            ));
        }

        Ok(())
    }

    async fn delete_identity_link(&self, user_id: UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM billing_identity_links WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete identity link", e))?;

        Ok(())
    }

    async fn find_pending_session(
        &self,
        user_id: UserId,
    ) -> Result<Option<PendingCheckoutSession>, DomainError> {
        let row: Option<PendingSessionRow> = sqlx::query_as(
            r#"
            SELECT user_id, session_id, product_id, payment_term, quantity
            FROM billing_pending_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find pending session", e))?;

        row.map(PendingCheckoutSession::try_from).transpose()
    }

    async fn insert_pending_session(
        &self,
        session: &PendingCheckoutSession,
    ) -> Result<(), DomainError> {
        let quantity = i32::try_from(session.quantity).map_err(|_| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Quantity out of range: {}", session.quantity),
            )
        })?;

        // One pending session per user; a new checkout replaces any prior one.
        sqlx::query(
            r#"
            INSERT INTO billing_pending_sessions
                (user_id, session_id, product_id, payment_term, quantity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                session_id = EXCLUDED.session_id,
                product_id = EXCLUDED.product_id,
                payment_term = EXCLUDED.payment_term,
                quantity = EXCLUDED.quantity,
                created_at = NOW()
            "#,
        )
        .bind(session.user_id.as_i64())
        .bind(&session.session_id)
        .bind(&session.product_id)
        .bind(&session.payment_term)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert pending session", e))?;

        Ok(())
    }

    async fn delete_pending_session(
        &self,
        user_id: UserId,
        filter: &PendingSessionFilter,
    ) -> Result<(), DomainError> {
        let quantity: Option<i32> = match filter.quantity {
            Some(q) => Some(i32::try_from(q).map_err(|_| {
                DomainError::new(
                    ErrorCode::ValidationFailed,
                    format!("Quantity out of range: {}", q),
                )
            })?),
            None => None,
        };

        // NULL filter components match any value.
        sqlx::query(
            r#"
            DELETE FROM billing_pending_sessions
            WHERE user_id = $1
              AND ($2::TEXT IS NULL OR product_id = $2)
              AND ($3::TEXT IS NULL OR payment_term = $3)
              AND ($4::INT IS NULL OR quantity = $4)
            "#,
        )
        .bind(user_id.as_i64())
        .bind(&filter.product_id)
        .bind(&filter.payment_term)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete pending session", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_link_row_converts() {
        let row = IdentityLinkRow {
            user_id: 42,
            customer_id: Some("cus_abc".to_string()),
            subscription_id: None,
        };

        let link = IdentityLink::try_from(row).unwrap();
        assert_eq!(link.user_id.as_i64(), 42);
        assert_eq!(link.customer_id.as_deref(), Some("cus_abc"));
        assert!(link.subscription_id.is_none());
    }

    #[test]
    fn identity_link_row_rejects_non_positive_user_id() {
        let row = IdentityLinkRow {
            user_id: 0,
            customer_id: None,
            subscription_id: None,
        };

        let result = IdentityLink::try_from(row);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code, ErrorCode::DatabaseError);
    }

    #[test]
    fn pending_session_row_converts() {
        let row = PendingSessionRow {
            user_id: 7,
            session_id: "cs_123".to_string(),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: 3,
        };

        let session = PendingCheckoutSession::try_from(row).unwrap();
        assert_eq!(session.user_id.as_i64(), 7);
        assert_eq!(session.quantity, 3);
    }

    #[test]
    fn pending_session_row_rejects_negative_quantity() {
        let row = PendingSessionRow {
            user_id: 7,
            session_id: "cs_123".to_string(),
            product_id: "speedsentry".to_string(),
            payment_term: "monthly".to_string(),
            quantity: -1,
        };

        assert!(PendingCheckoutSession::try_from(row).is_err());
    }
}
