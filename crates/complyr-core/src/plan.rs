use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Subscription plan tier.
///
/// Tiers form a closed total order (`Basic < Pro < Premium`). The order is the
/// only thing the engine relies on: every "minimum plan" check is a rank
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Basic,
    Pro,
    Premium,
}

impl PlanTier {
    /// Every tier, lowest rank first.
    pub const ALL: [PlanTier; 3] = [PlanTier::Basic, PlanTier::Pro, PlanTier::Premium];

    /// Strictly monotonic rank used for minimum-plan comparisons.
    pub fn rank(self) -> u8 {
        match self {
            PlanTier::Basic => 0,
            PlanTier::Pro => 1,
            PlanTier::Premium => 2,
        }
    }

    /// `true` when `self` ranks at or above `required`.
    pub fn satisfies(self, required: PlanTier) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Pro => "pro",
            PlanTier::Premium => "premium",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(PlanTier::Basic),
            "pro" => Ok(PlanTier::Pro),
            "premium" => Ok(PlanTier::Premium),
            other => Err(anyhow!(
                "unknown plan tier '{other}', expected one of: basic, pro, premium"
            )),
        }
    }
}

impl PartialOrd for PlanTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlanTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
