//! Validation Utilities
//!
//! Parameter checks run before any computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

pub const MIN_TOP_N: usize = 3;
pub const MAX_TOP_N: usize = 10;
pub const DEFAULT_TOP_N: usize = 5;

/// Validate a zone name given by a user
///
/// Rules:
/// - Length: 1-128 characters
/// - No commas (selection lists are comma-separated)
/// - No control characters
///
/// # Examples
/// ```
/// use gridload_model::validate_zone_name;
///
/// assert!(validate_zone_name("pjm_rto").is_ok());
/// assert!(validate_zone_name("Mid-Atlantic Region").is_ok());
/// assert!(validate_zone_name("").is_err());
/// assert!(validate_zone_name("a,b").is_err());
/// ```
pub fn validate_zone_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ModelError::validation("Zone name cannot be empty"));
    }
    if name.chars().count() > 128 {
        return Err(ModelError::validation(format!(
            "Zone name too long ({} characters). Maximum length is 128 characters.",
            name.chars().count()
        )));
    }
    if name.contains(',') || name.chars().any(char::is_control) {
        return Err(ModelError::validation(format!(
            "Zone name cannot contain commas or control characters: '{}'",
            name.escape_debug()
        )));
    }
    Ok(())
}

/// How many zones the top/bottom rankings show, within `3..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TopN(usize);

impl TopN {
    pub fn new(n: usize) -> Result<Self> {
        if !(MIN_TOP_N..=MAX_TOP_N).contains(&n) {
            return Err(ModelError::validation(format!(
                "Top-N must be between {} and {}, got {}",
                MIN_TOP_N, MAX_TOP_N, n
            )));
        }
        Ok(Self(n))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self(DEFAULT_TOP_N)
    }
}

impl TryFrom<usize> for TopN {
    type Error = ModelError;

    fn try_from(n: usize) -> Result<Self> {
        Self::new(n)
    }
}

impl From<TopN> for usize {
    fn from(n: TopN) -> Self {
        n.0
    }
}

impl FromStr for TopN {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| ModelError::validation(format!("Top-N must be an integer, got '{}'", s)))?;
        Self::new(n)
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_top_n_bounds() {
        assert!(TopN::new(2).is_err());
        assert!(TopN::new(11).is_err());
        assert_eq!(TopN::new(3).unwrap().get(), 3);
        assert_eq!(TopN::new(10).unwrap().get(), 10);
        assert_eq!(TopN::default().get(), DEFAULT_TOP_N);
    }

    #[test]
    fn test_top_n_parse() {
        assert_eq!("7".parse::<TopN>().unwrap().get(), 7);
        assert!(matches!("seven".parse::<TopN>(), Err(ModelError::Validation(_))));
        assert!("0".parse::<TopN>().is_err());
    }

    #[test]
    fn test_top_n_serde_validates() {
        let n: TopN = serde_json::from_str("4").unwrap();
        assert_eq!(n.get(), 4);
        assert!(serde_json::from_str::<TopN>("42").is_err());
        assert_eq!(serde_json::to_string(&n).unwrap(), "4");
    }

    #[test]
    fn test_zone_name_rules() {
        assert!(validate_zone_name("dom").is_ok());
        assert!(validate_zone_name(&"x".repeat(129)).is_err());
        assert!(validate_zone_name("tab\there").is_err());
    }
}
