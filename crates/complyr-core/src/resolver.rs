//! Capability resolution pipeline.
//!
//! `subscription → base deriver → override rules → trial gate`. Every stage is
//! a pure function; the same inputs always produce the same set.

use tracing::debug;

use crate::capability::{CapabilityKey, ResolvedCapabilities};
use crate::plan::PlanTier;
use crate::rules::OverrideRegistry;
use crate::subscription::{Subscription, SubscriptionStatus};

/// Plan-gated capabilities granted by each tier.
fn plan_grants(tier: PlanTier, key: CapabilityKey) -> bool {
    match key {
        CapabilityKey::StorytellingBlocks | CapabilityKey::StylingControls => {
            tier.satisfies(PlanTier::Pro)
        }
        CapabilityKey::InteractionBlocks => tier.satisfies(PlanTier::Premium),
        CapabilityKey::CmsAccess | CapabilityKey::BlockEditor | CapabilityKey::Publishing => false,
    }
}

/// Map plan tier and status to the capability set before any override.
///
/// `expired` is absorbing: every capability is denied. `past_due` keeps
/// authoring but blocks publishing.
pub fn derive_base_capabilities(subscription: &Subscription) -> ResolvedCapabilities {
    let status = subscription.status;
    if status == SubscriptionStatus::Expired {
        return ResolvedCapabilities::none();
    }

    let is_trial = status == SubscriptionStatus::TrialActive;
    let is_active = status == SubscriptionStatus::Active;
    let is_past_due = status == SubscriptionStatus::PastDue;
    let tier = subscription.plan_tier;

    // past_due is a grace period: authoring stays open.
    let mut caps = ResolvedCapabilities::from_fn(|key| match key {
        CapabilityKey::CmsAccess | CapabilityKey::BlockEditor => {
            is_active || is_trial || is_past_due
        }
        CapabilityKey::Publishing => is_active,
        plan_gated => plan_grants(tier, plan_gated),
    });

    if status == SubscriptionStatus::PastDue {
        caps.deny(CapabilityKey::Publishing);
    }
    caps
}

/// Intersect `caps` with every deny triggered by the registry.
///
/// `publishing` is the publishing capability as resolved before overrides; it
/// feeds the `requires_publishing` condition so the outcome does not depend on
/// rule order. Feature-only rules (no capability key) are skipped here and
/// consulted by the publishing validator instead.
pub fn apply_override_rules(
    caps: ResolvedCapabilities,
    subscription: &Subscription,
    registry: &OverrideRegistry,
    publishing: bool,
) -> ResolvedCapabilities {
    let mut out = caps;
    for rule in registry.rules() {
        let Some(key) = rule.capability_key else {
            continue;
        };
        if let Some(reason) = rule.evaluate(subscription, publishing) {
            debug!(
                organization_id = %subscription.organization_id,
                feature_key = %rule.feature_key,
                capability = %key,
                ?reason,
                "override rule denied capability"
            );
            out.deny(key);
        }
    }
    out
}

/// Force publishing off during an active trial.
pub fn apply_trial_gate(
    caps: ResolvedCapabilities,
    subscription: &Subscription,
) -> ResolvedCapabilities {
    let mut out = caps;
    if subscription.is_trial() {
        out.deny(CapabilityKey::Publishing);
    }
    out
}

/// Base capabilities with the trial gate applied; no registry.
pub fn resolve_capabilities(subscription: &Subscription) -> ResolvedCapabilities {
    apply_trial_gate(derive_base_capabilities(subscription), subscription)
}

/// Full pipeline: base deriver, override registry, trial gate.
pub fn resolve_capabilities_with_registry(
    subscription: &Subscription,
    registry: &OverrideRegistry,
) -> ResolvedCapabilities {
    if subscription.status == SubscriptionStatus::Expired {
        return ResolvedCapabilities::none();
    }

    let gated = resolve_capabilities(subscription);
    let publishing = gated.get(CapabilityKey::Publishing);
    let overridden = apply_override_rules(gated, subscription, registry, publishing);
    apply_trial_gate(overridden, subscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{OverrideRule, OverrideRuleDefinition, RuleEffect};

    fn sub(plan_tier: PlanTier, status: SubscriptionStatus) -> Subscription {
        Subscription {
            organization_id: "org_test".to_string(),
            plan_tier,
            status,
            trial_started_at: None,
            trial_expires_at: None,
        }
    }

    fn rule(feature_key: &str, capability: CapabilityKey) -> OverrideRuleDefinition {
        OverrideRuleDefinition {
            feature_key: feature_key.to_string(),
            capability_key: Some(capability.as_str().to_string()),
            minimum_plan: "basic".to_string(),
            requires_active_subscription: false,
            requires_publishing: false,
            visible_in_trial: true,
            usable_in_trial: true,
            enabled: true,
            effect: RuleEffect::Deny,
        }
    }

    #[test]
    fn basic_active_gets_editor_and_publishing_only() {
        let caps = resolve_capabilities(&sub(PlanTier::Basic, SubscriptionStatus::Active));
        assert!(caps.get(CapabilityKey::CmsAccess));
        assert!(caps.get(CapabilityKey::BlockEditor));
        assert!(caps.get(CapabilityKey::Publishing));
        assert!(!caps.get(CapabilityKey::StorytellingBlocks));
        assert!(!caps.get(CapabilityKey::InteractionBlocks));
        assert!(!caps.get(CapabilityKey::StylingControls));
    }

    #[test]
    fn pro_grants_storytelling_and_styling_but_not_interaction() {
        let caps = resolve_capabilities(&sub(PlanTier::Pro, SubscriptionStatus::Active));
        assert!(caps.get(CapabilityKey::StorytellingBlocks));
        assert!(caps.get(CapabilityKey::StylingControls));
        assert!(!caps.get(CapabilityKey::InteractionBlocks));
    }

    #[test]
    fn past_due_keeps_authoring_blocks_publishing() {
        let caps = resolve_capabilities(&sub(PlanTier::Pro, SubscriptionStatus::PastDue));
        assert!(caps.get(CapabilityKey::CmsAccess));
        assert!(caps.get(CapabilityKey::BlockEditor));
        assert!(caps.get(CapabilityKey::StorytellingBlocks));
        assert!(!caps.get(CapabilityKey::Publishing));
    }

    #[test]
    fn canceled_loses_cms_access() {
        let caps = resolve_capabilities(&sub(PlanTier::Premium, SubscriptionStatus::Canceled));
        assert!(!caps.get(CapabilityKey::CmsAccess));
        assert!(!caps.get(CapabilityKey::BlockEditor));
        assert!(!caps.get(CapabilityKey::Publishing));
    }

    #[test]
    fn expired_is_absorbing_even_with_rules() {
        let registry =
            OverrideRegistry::from_definitions(vec![rule("r", CapabilityKey::CmsAccess)]).unwrap();
        for tier in PlanTier::ALL {
            let expired = sub(tier, SubscriptionStatus::Expired);
            let caps = resolve_capabilities_with_registry(&expired, &registry);
            assert_eq!(caps, ResolvedCapabilities::none());
        }
    }

    #[test]
    fn override_denies_governed_key() {
        let mut d = rule("storytelling_premium_only", CapabilityKey::StorytellingBlocks);
        d.minimum_plan = "premium".to_string();
        let registry = OverrideRegistry::from_definitions(vec![d]).unwrap();

        let pro = sub(PlanTier::Pro, SubscriptionStatus::Active);
        let caps = resolve_capabilities_with_registry(&pro, &registry);
        assert!(!caps.get(CapabilityKey::StorytellingBlocks));
        assert!(caps.get(CapabilityKey::StylingControls));
    }

    #[test]
    fn passing_override_cannot_grant_what_base_denies() {
        let registry =
            OverrideRegistry::from_definitions(vec![rule("ix", CapabilityKey::InteractionBlocks)])
                .unwrap();
        let caps = resolve_capabilities_with_registry(
            &sub(PlanTier::Basic, SubscriptionStatus::Active),
            &registry,
        );
        assert!(!caps.get(CapabilityKey::InteractionBlocks));
    }

    #[test]
    fn any_triggered_rule_for_a_key_denies_it() {
        let lenient = rule("styling_a", CapabilityKey::StylingControls);
        let mut strict = rule("styling_b", CapabilityKey::StylingControls);
        strict.minimum_plan = "premium".to_string();
        let registry = OverrideRegistry::from_definitions(vec![lenient, strict]).unwrap();
        let pro = sub(PlanTier::Pro, SubscriptionStatus::Active);
        let caps = resolve_capabilities_with_registry(&pro, &registry);
        assert!(!caps.get(CapabilityKey::StylingControls));
    }

    #[test]
    fn requires_publishing_uses_gated_publishing() {
        let mut d = rule("styling_needs_publish", CapabilityKey::StylingControls);
        d.requires_publishing = true;
        let registry = OverrideRegistry::from_definitions(vec![d]).unwrap();

        let trial = resolve_capabilities_with_registry(
            &sub(PlanTier::Premium, SubscriptionStatus::TrialActive),
            &registry,
        );
        assert!(!trial.get(CapabilityKey::StylingControls));

        let active = resolve_capabilities_with_registry(
            &sub(PlanTier::Premium, SubscriptionStatus::Active),
            &registry,
        );
        assert!(active.get(CapabilityKey::StylingControls));
    }

    #[test]
    fn trial_gate_holds_against_rules_on_publishing() {
        let unchecked = OverrideRule {
            feature_key: "publish_anyway".to_string(),
            capability_key: Some(CapabilityKey::Publishing),
            minimum_plan: PlanTier::Basic,
            requires_active_subscription: false,
            requires_publishing: false,
            visible_in_trial: true,
            usable_in_trial: true,
            enabled: true,
        };
        let registry = OverrideRegistry::from_rules(vec![unchecked]);
        let caps = resolve_capabilities_with_registry(
            &sub(PlanTier::Premium, SubscriptionStatus::TrialActive),
            &registry,
        );
        assert!(!caps.get(CapabilityKey::Publishing));
        assert!(caps.get(CapabilityKey::InteractionBlocks));
    }

    #[test]
    fn feature_only_rules_do_not_touch_capabilities() {
        let mut d = rule("block.quiz", CapabilityKey::CmsAccess);
        d.capability_key = None;
        d.minimum_plan = "premium".to_string();
        let registry = OverrideRegistry::from_definitions(vec![d]).unwrap();
        let s = sub(PlanTier::Basic, SubscriptionStatus::Active);
        assert_eq!(
            resolve_capabilities_with_registry(&s, &registry),
            resolve_capabilities(&s)
        );
    }
}
