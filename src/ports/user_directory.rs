//! User directory port.
//!
//! The host CMS owns user accounts; this service only needs to confirm a
//! user exists and fetch the handful of fields the payment provider wants.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// A host user as seen by the billing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

/// Directory port for host user lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a host user by internal ID.
    ///
    /// Returns `None` if no such user exists.
    async fn find_user(&self, user_id: UserId) -> Result<Option<HostUser>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn user_directory_is_object_safe() {
        fn _accepts_dyn(_dir: &dyn UserDirectory) {}
    }
}
