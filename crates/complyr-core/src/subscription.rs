use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::PlanTier;

/// Length of the synthetic trial window granted to organizations without a
/// subscription record.
pub const DEFAULT_TRIAL_DAYS: i64 = 14;

/// Upper bound on a configured trial window (ten years).
pub const MAX_TRIAL_DAYS: i64 = 3_650;

/// Clamp a configured trial length into `0..=MAX_TRIAL_DAYS`.
pub fn clamp_trial_days(trial_days: i64) -> i64 {
    trial_days.clamp(0, MAX_TRIAL_DAYS)
}

/// Lifecycle status of a subscription. Exactly one holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    TrialActive,
    Active,
    PastDue,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 5] = [
        SubscriptionStatus::TrialActive,
        SubscriptionStatus::Active,
        SubscriptionStatus::PastDue,
        SubscriptionStatus::Canceled,
        SubscriptionStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::TrialActive => "trial_active",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

/// Read-only view of an organization's subscription.
///
/// Mutated only by the billing lifecycle; the engine never writes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub organization_id: String,
    pub plan_tier: PlanTier,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub trial_started_at: Option<DateTime<Utc>>,
    /// Only meaningful while `status == TrialActive`.
    #[serde(default)]
    pub trial_expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Subscription synthesised for an organization with no record: Premium
    /// tier in an active trial that starts at `now`.
    ///
    /// `trial_days` is clamped to `MAX_TRIAL_DAYS`. If the window end falls
    /// outside the representable range it is left unknown.
    pub fn default_for(organization_id: &str, now: DateTime<Utc>, trial_days: i64) -> Self {
        let window = Duration::days(clamp_trial_days(trial_days));
        Self {
            organization_id: organization_id.to_string(),
            plan_tier: PlanTier::Premium,
            status: SubscriptionStatus::TrialActive,
            trial_started_at: Some(now),
            trial_expires_at: now.checked_add_signed(window),
        }
    }

    pub fn is_trial(&self) -> bool {
        self.status == SubscriptionStatus::TrialActive
    }

    /// Whole days left in the trial window, rounded up and clamped at zero.
    ///
    /// `None` outside of a trial or when the window end is unknown. Reporting
    /// only: the trial gate keys off `status`, not the clock.
    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.is_trial() {
            return None;
        }
        let expires = self.trial_expires_at?;
        let secs = (expires - now).num_seconds();
        if secs <= 0 {
            return Some(0);
        }
        Some((secs + 86_399) / 86_400)
    }
}
