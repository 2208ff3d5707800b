//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// Base URL of the host site, used to build checkout redirect URLs
    pub site_base_url: String,

    /// Override for the Stripe API base URL (test harnesses)
    pub api_base_url: Option<String>,

    /// Required User-Agent prefix on webhook deliveries
    #[serde(default = "default_user_agent_prefix")]
    pub webhook_user_agent_prefix: String,

    /// Reject webhook events not generated in live mode
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if self.site_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("SITE_BASE_URL"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.expose_secret().starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.expose_secret().starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if !self.site_base_url.starts_with("http://") && !self.site_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidSiteBaseUrl);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: SecretString::new(String::new()),
            stripe_webhook_secret: SecretString::new(String::new()),
            site_base_url: String::new(),
            api_base_url: None,
            webhook_user_agent_prefix: default_user_agent_prefix(),
            require_livemode: false,
        }
    }
}

fn default_user_agent_prefix() -> String {
    "Stripe/1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: SecretString::new("sk_test_abcd1234".to_string()),
            stripe_webhook_secret: SecretString::new("whsec_xyz789".to_string()),
            site_base_url: "https://example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_test_mode() {
        let config = valid_config();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_is_live_mode() {
        let config = PaymentConfig {
            stripe_api_key: SecretString::new("sk_live_xxx".to_string()),
            ..valid_config()
        };
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = PaymentConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = PaymentConfig {
            stripe_api_key: SecretString::new("pk_test_xxx".to_string()), // Wrong prefix
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        let config = PaymentConfig {
            stripe_webhook_secret: SecretString::new("secret_xxx".to_string()), // Wrong prefix
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_requires_site_base_url() {
        let config = PaymentConfig {
            site_base_url: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = PaymentConfig {
            site_base_url: "ftp://example.com".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_user_agent_prefix_default() {
        let config = PaymentConfig::default();
        assert_eq!(config.webhook_user_agent_prefix, "Stripe/1.0");
    }
}
