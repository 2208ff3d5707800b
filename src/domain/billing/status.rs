//! Subscription status classification.
//!
//! Provider status strings are passed through the system untouched; the
//! two predicates below are the only places that interpret them. New
//! provider statuses default to "held" on the checkout path, which is
//! the safe direction (reject a duplicate purchase rather than allow a
//! double subscription).

/// True if the subscription currently grants service ("active" or
/// "trialing").
pub fn is_active_or_trialing(status: &str) -> bool {
    matches!(status, "active" | "trialing")
}

/// True if the subscription is dead and no longer blocks a new purchase.
pub fn is_defunct(status: &str) -> bool {
    matches!(status, "incomplete" | "incomplete_expired" | "canceled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_and_trialing_grant_service() {
        assert!(is_active_or_trialing("active"));
        assert!(is_active_or_trialing("trialing"));
        assert!(!is_active_or_trialing("past_due"));
        assert!(!is_active_or_trialing("canceled"));
        assert!(!is_active_or_trialing(""));
    }

    #[test]
    fn defunct_statuses_do_not_block_checkout() {
        assert!(is_defunct("incomplete"));
        assert!(is_defunct("incomplete_expired"));
        assert!(is_defunct("canceled"));
    }

    #[test]
    fn unknown_statuses_block_checkout() {
        assert!(!is_defunct("past_due"));
        assert!(!is_defunct("unpaid"));
        assert!(!is_defunct("paused"));
        assert!(!is_defunct(""));
    }
}
