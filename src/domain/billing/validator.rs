//! Request-origin gate for inbound webhook deliveries.
//!
//! Cheap header screening that runs before the body is read or the
//! signature checked. Real authentication is the signature; this gate
//! just turns away traffic that is obviously not the provider.

use super::WebhookError;

/// Validates that a request's headers look like a provider delivery.
///
/// Both checks are case-insensitive prefix matches, so versioned values
/// like `Stripe/1.0 (+https://...)` and parameterized content types like
/// `application/json; charset=utf-8` pass.
#[derive(Debug, Clone)]
pub struct EventValidator {
    user_agent_prefix: String,
    content_type_prefix: String,
}

impl EventValidator {
    /// Creates a validator expecting the given User-Agent prefix.
    pub fn new(user_agent_prefix: impl Into<String>) -> Self {
        Self {
            user_agent_prefix: user_agent_prefix.into(),
            content_type_prefix: "application/json".to_string(),
        }
    }

    /// Checks the request headers. Absent headers fail.
    pub fn validate(
        &self,
        user_agent: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<(), WebhookError> {
        if !prefix_matches(user_agent, &self.user_agent_prefix)
            || !prefix_matches(content_type, &self.content_type_prefix)
        {
            return Err(WebhookError::InvalidOrigin);
        }
        Ok(())
    }
}

fn prefix_matches(value: Option<&str>, prefix: &str) -> bool {
    match value {
        Some(v) => v
            .to_ascii_lowercase()
            .starts_with(&prefix.to_ascii_lowercase()),
        None => false,
    }
}
