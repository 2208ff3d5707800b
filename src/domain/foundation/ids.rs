//! Host user identifier value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Internal host user identifier.
///
/// The host CMS keys users by a positive integer. Webhook metadata carries
/// this value as a string; anything that does not parse to a positive
/// integer is treated as "no user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a new UserId, returning error if not positive.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format(
                "user_id",
                "must be a positive integer",
            ));
        }
        Ok(Self(id))
    }

    /// Parses a metadata string into a UserId. Returns `None` for anything
    /// that is not a positive integer, including the empty string.
    pub fn parse_metadata(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(|n| Self::new(n).ok())
    }

    /// Returns the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid_format("user_id", "not an integer"))?;
        Self::new(n)
    }
}
