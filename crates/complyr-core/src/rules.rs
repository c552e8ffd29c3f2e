//! Administrator-defined override rules.
//!
//! Rules arrive as raw [`OverrideRuleDefinition`] records and are linted into
//! [`OverrideRule`] values before they reach the evaluator. A linted rule can
//! only ever deny: the grant effect is rejected at load time and has no
//! representation afterwards.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::CapabilityKey;
use crate::plan::PlanTier;
use crate::subscription::{Subscription, SubscriptionStatus};

/// What a rule claims to do when it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    #[default]
    Deny,
    Grant,
}

fn default_true() -> bool {
    true
}

fn default_minimum_plan() -> String {
    "basic".to_string()
}

/// Raw feature-registry entry as stored by the administrative collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRuleDefinition {
    pub feature_key: String,
    #[serde(default)]
    pub capability_key: Option<String>,
    #[serde(default = "default_minimum_plan")]
    pub minimum_plan: String,
    #[serde(default)]
    pub requires_active_subscription: bool,
    #[serde(default)]
    pub requires_publishing: bool,
    #[serde(default = "default_true")]
    pub visible_in_trial: bool,
    #[serde(default = "default_true")]
    pub usable_in_trial: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub effect: RuleEffect,
}

/// Lint failure for a single rule definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule has an empty feature_key")]
    EmptyFeatureKey,

    #[error("rule '{0}' declares a grant effect; override rules may only deny")]
    GrantNotPermitted(String),

    #[error("rule '{feature_key}' references unknown capability '{capability}'")]
    UnknownCapability {
        feature_key: String,
        capability: String,
    },

    #[error("rule '{feature_key}' references unknown plan tier '{plan}'")]
    UnknownPlan { feature_key: String, plan: String },

    #[error("feature_key '{0}' is defined more than once")]
    DuplicateFeatureKey(String),
}

/// Every lint failure found in a rule snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("override registry rejected: {}", render_errors(.errors))]
pub struct RegistryError {
    pub errors: Vec<RuleError>,
}

fn render_errors(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a rule denied its governed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    RequiresActiveSubscription,
    BelowMinimumPlan { required: PlanTier },
    RequiresPublishing,
    HiddenInTrial,
    UnusableInTrial,
}

/// Linted override rule. Flat record of independent conditions evaluated in a
/// fixed order by [`OverrideRule::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideRule {
    pub feature_key: String,
    pub capability_key: Option<CapabilityKey>,
    pub minimum_plan: PlanTier,
    pub requires_active_subscription: bool,
    pub requires_publishing: bool,
    pub visible_in_trial: bool,
    pub usable_in_trial: bool,
    pub enabled: bool,
}

impl TryFrom<OverrideRuleDefinition> for OverrideRule {
    type Error = RuleError;

    fn try_from(def: OverrideRuleDefinition) -> Result<Self, Self::Error> {
        let feature_key = def.feature_key.trim().to_string();
        if feature_key.is_empty() {
            return Err(RuleError::EmptyFeatureKey);
        }
        if def.effect == RuleEffect::Grant {
            return Err(RuleError::GrantNotPermitted(feature_key));
        }
        let capability_key = match def.capability_key.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(CapabilityKey::parse(raw).map_err(|_| {
                RuleError::UnknownCapability {
                    feature_key: feature_key.clone(),
                    capability: raw.to_string(),
                }
            })?),
        };
        let minimum_plan =
            PlanTier::parse(&def.minimum_plan).map_err(|_| RuleError::UnknownPlan {
                feature_key: feature_key.clone(),
                plan: def.minimum_plan.clone(),
            })?;

        Ok(Self {
            feature_key,
            capability_key,
            minimum_plan,
            requires_active_subscription: def.requires_active_subscription,
            requires_publishing: def.requires_publishing,
            visible_in_trial: def.visible_in_trial,
            usable_in_trial: def.usable_in_trial,
            enabled: def.enabled,
        })
    }
}

impl OverrideRule {
    /// Run the condition chain against `subscription`.
    ///
    /// The first condition that fires decides; later conditions are not
    /// consulted. `publishing` is the publishing capability as resolved by the
    /// base deriver and the trial gate.
    pub fn evaluate(&self, subscription: &Subscription, publishing: bool) -> Option<DenyReason> {
        let in_trial = subscription.is_trial();
        if self.requires_active_subscription && subscription.status != SubscriptionStatus::Active {
            return Some(DenyReason::RequiresActiveSubscription);
        }
        if !subscription.plan_tier.satisfies(self.minimum_plan) {
            return Some(DenyReason::BelowMinimumPlan {
                required: self.minimum_plan,
            });
        }
        if self.requires_publishing && !publishing {
            return Some(DenyReason::RequiresPublishing);
        }
        if in_trial && !self.visible_in_trial {
            return Some(DenyReason::HiddenInTrial);
        }
        if in_trial && !self.usable_in_trial {
            return Some(DenyReason::UnusableInTrial);
        }
        None
    }
}

/// Immutable snapshot of the enabled override rules for one resolution.
#[derive(Debug, Clone)]
pub struct OverrideRegistry {
    rules: Arc<[OverrideRule]>,
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        Self::from_rules(Vec::new())
    }
}

impl OverrideRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap already-linted rules as-is, without dropping disabled ones.
    pub fn from_rules(rules: Vec<OverrideRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// Lint every definition and keep the enabled ones.
    ///
    /// Fails with every lint error in the snapshot if any definition is
    /// malformed, including disabled ones: a bad rule is never silently
    /// dropped.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = OverrideRuleDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let mut rules = Vec::new();

        for def in definitions {
            match OverrideRule::try_from(def) {
                Ok(rule) => {
                    if !seen.insert(rule.feature_key.clone()) {
                        errors.push(RuleError::DuplicateFeatureKey(rule.feature_key));
                        continue;
                    }
                    if rule.enabled {
                        rules.push(rule);
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(RegistryError { errors });
        }
        Ok(Self::from_rules(rules))
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_for(&self, feature_key: &str) -> Option<&OverrideRule> {
        self.rules.iter().find(|rule| rule.feature_key == feature_key)
    }

    /// Denial produced by the rule registered for `feature_key`, or `None`
    /// when no rule governs the feature or it passes.
    pub fn feature_denied(
        &self,
        feature_key: &str,
        subscription: &Subscription,
        publishing: bool,
    ) -> Option<DenyReason> {
        self.rule_for(feature_key)?.evaluate(subscription, publishing)
    }
}
