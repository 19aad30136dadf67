use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SliceError;

/// Byte ceiling used when neither a token budget nor a byte budget is given.
pub const DEFAULT_MAX_BYTES: usize = 400_000;

/// The unit a budget is counted in. Exactly one is active per slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetDimension {
    Bytes,
    Tokens,
}

/// A named context window: usable space is capacity minus the room kept for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceProfile {
    pub name: &'static str,
    pub total_capacity: usize,
    pub reserved_output_margin: usize,
}

impl ResourceProfile {
    pub fn available(&self) -> usize {
        self.total_capacity.saturating_sub(self.reserved_output_margin)
    }
}

pub const PROFILES: &[ResourceProfile] = &[
    ResourceProfile { name: "gpt-4o", total_capacity: 128_000, reserved_output_margin: 16_384 },
    ResourceProfile { name: "gpt-4.1", total_capacity: 1_047_576, reserved_output_margin: 32_768 },
    ResourceProfile { name: "claude-sonnet", total_capacity: 200_000, reserved_output_margin: 8_192 },
    ResourceProfile { name: "gemini-pro", total_capacity: 1_048_576, reserved_output_margin: 8_192 },
    ResourceProfile { name: "small", total_capacity: 8_192, reserved_output_margin: 1_024 },
];

pub fn find_profile(name: &str) -> Option<&'static ResourceProfile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// Approximate token count: `ceil(chars / 3.5)`, in integer arithmetic so the
/// same text always yields the same estimate.
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    (2 * chars).div_ceil(7)
}

/// Running total against a ceiling in one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub dimension: BudgetDimension,
    pub ceiling: usize,
    pub used: usize,
}

impl Budget {
    pub fn bytes(ceiling: usize) -> Self {
        Self { dimension: BudgetDimension::Bytes, ceiling, used: 0 }
    }

    pub fn tokens(ceiling: usize) -> Self {
        Self { dimension: BudgetDimension::Tokens, ceiling, used: 0 }
    }

    /// Picks the active dimension and ceiling.
    ///
    /// A profile or an explicit token limit selects tokens, with the explicit
    /// limit taking precedence over the profile value. Otherwise bytes are
    /// counted against `max_bytes` or [`DEFAULT_MAX_BYTES`].
    pub fn derive(
        profile: Option<&str>,
        max_tokens: Option<usize>,
        max_bytes: Option<usize>,
    ) -> Result<Self, SliceError> {
        let profile = match profile {
            Some(name) => {
                Some(find_profile(name).ok_or_else(|| SliceError::UnknownProfile(name.to_string()))?)
            }
            None => None,
        };

        let token_ceiling = max_tokens.or_else(|| profile.map(|p| p.available()));
        let budget = match token_ceiling {
            Some(ceiling) => {
                if let Some(bytes) = max_bytes {
                    warn!("Ignoring byte budget of {} since a token budget is active", bytes);
                }
                Budget::tokens(ceiling)
            }
            None => Budget::bytes(max_bytes.unwrap_or(DEFAULT_MAX_BYTES)),
        };
        debug!("Derived budget: {:?}", budget);
        Ok(budget)
    }

    pub fn fits(&self, cost: usize) -> bool {
        self.used.saturating_add(cost) <= self.ceiling
    }

    pub fn charge(&mut self, cost: usize) {
        self.used += cost;
    }

    pub fn remaining(&self) -> usize {
        self.ceiling.saturating_sub(self.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcdefg"), 2); // 7 / 3.5
        assert_eq!(estimate_tokens("abcdefgh"), 3); // 8 / 3.5 = 2.28
        assert_eq!(estimate_tokens(&"x".repeat(35)), 10);
    }

    #[test]
    fn test_estimate_tokens_counts_chars_not_bytes() {
        assert_eq!(estimate_tokens("ééééééé"), 2);
    }

    #[test]
    fn test_profile_derives_token_budget() {
        let budget = Budget::derive(Some("gpt-4o"), None, None).unwrap();
        assert_eq!(budget.dimension, BudgetDimension::Tokens);
        assert_eq!(budget.ceiling, 128_000 - 16_384);
        assert_eq!(budget.used, 0);
    }

    #[test]
    fn test_explicit_tokens_override_profile() {
        let budget = Budget::derive(Some("claude-sonnet"), Some(5_000), None).unwrap();
        assert_eq!(budget, Budget::tokens(5_000));
    }

    #[test]
    fn test_tokens_and_bytes_never_combine() {
        let budget = Budget::derive(None, Some(1_000), Some(50)).unwrap();
        assert_eq!(budget, Budget::tokens(1_000));
    }

    #[test]
    fn test_byte_budget_default_and_explicit() {
        assert_eq!(Budget::derive(None, None, None).unwrap(), Budget::bytes(DEFAULT_MAX_BYTES));
        assert_eq!(Budget::derive(None, None, Some(100)).unwrap(), Budget::bytes(100));
    }

    #[test]
    fn test_unknown_profile() {
        let err = Budget::derive(Some("nope"), None, None).unwrap_err();
        assert!(matches!(err, SliceError::UnknownProfile(name) if name == "nope"));
    }

    #[test]
    fn test_fits_and_charge() {
        let mut budget = Budget::bytes(100);
        assert!(budget.fits(100));
        budget.charge(40);
        assert!(!budget.fits(70));
        assert!(budget.fits(60));
        assert_eq!(budget.remaining(), 60);
    }
}
