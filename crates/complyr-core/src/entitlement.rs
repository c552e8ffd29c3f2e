//! Numeric plan entitlements and usage reporting.
//!
//! Advisory only: nothing here blocks an operation. Callers enforcing a limit
//! check [`EntitlementUsage::has_headroom`] before creating a record.

use serde::{Deserialize, Serialize};

use crate::plan::PlanTier;

/// Usage share at which an entitlement is flagged as a warning.
pub const WARNING_THRESHOLD_PERCENT: f64 = 80.0;
/// Usage share at which an entitlement is flagged as critical.
pub const CRITICAL_THRESHOLD_PERCENT: f64 = 95.0;

/// Per-tier limit. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub basic: Option<u64>,
    pub pro: Option<u64>,
    pub premium: Option<u64>,
}

impl PlanLimits {
    pub fn for_plan(&self, tier: PlanTier) -> Option<u64> {
        match tier {
            PlanTier::Basic => self.basic,
            PlanTier::Pro => self.pro,
            PlanTier::Premium => self.premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementDefinition {
    pub key: String,
    pub label: String,
    pub limits: PlanLimits,
}

impl EntitlementDefinition {
    pub fn new(key: &str, label: &str, limits: PlanLimits) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            limits,
        }
    }
}

/// Catalog shipped with the engine.
pub fn default_entitlements() -> Vec<EntitlementDefinition> {
    vec![
        EntitlementDefinition::new(
            "published_records",
            "Published records",
            PlanLimits {
                basic: Some(10),
                pro: Some(100),
                premium: None,
            },
        ),
        EntitlementDefinition::new(
            "products",
            "Products",
            PlanLimits {
                basic: Some(25),
                pro: Some(250),
                premium: None,
            },
        ),
        EntitlementDefinition::new(
            "team_members",
            "Team members",
            PlanLimits {
                basic: Some(3),
                pro: Some(10),
                premium: Some(50),
            },
        ),
    ]
}

/// Usage report for one entitlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitlementUsage {
    pub key: String,
    pub label: String,
    pub limit: Option<u64>,
    pub current: u64,
    /// `None` iff `limit` is `None`.
    pub remaining: Option<u64>,
    /// Share of the limit in use, capped at 100. `None` when unlimited.
    pub percentage: Option<f64>,
    pub warning: bool,
    pub critical: bool,
}

impl EntitlementUsage {
    /// `true` while another unit may be created under this entitlement.
    pub fn has_headroom(&self) -> bool {
        self.remaining.map_or(true, |remaining| remaining > 0)
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit.is_none()
    }
}

/// Compare `current` against the limit `definition` sets for `tier`.
pub fn evaluate_usage(
    definition: &EntitlementDefinition,
    tier: PlanTier,
    current: u64,
) -> EntitlementUsage {
    let limit = definition.limits.for_plan(tier);
    let (remaining, percentage) = match limit {
        None => (None, None),
        Some(0) => (Some(0), Some(100.0)),
        Some(limit) => {
            let pct = (current as f64 * 100.0) / limit as f64;
            (Some(limit.saturating_sub(current)), Some(pct.min(100.0)))
        }
    };
    let warning = percentage.is_some_and(|p| p >= WARNING_THRESHOLD_PERCENT);
    let critical = percentage.is_some_and(|p| p >= CRITICAL_THRESHOLD_PERCENT);

    EntitlementUsage {
        key: definition.key.clone(),
        label: definition.label.clone(),
        limit,
        current,
        remaining,
        percentage,
        warning,
        critical,
    }
}
