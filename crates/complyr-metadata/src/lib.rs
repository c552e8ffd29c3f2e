//! In-memory implementation of the engine's collaborator stores.
//!
//! Holds subscriptions, the override registry snapshot and usage counters
//! behind `tokio::sync::RwLock`s. Deployments that keep this state in a
//! database implement the same three traits against their own backend.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use complyr_core::rules::{OverrideRegistry, OverrideRuleDefinition, RegistryError};
use complyr_core::store::{OverrideRegistryStore, SubscriptionProvider, UsageCounterSource};
use complyr_core::subscription::Subscription;

/// One usage counter row in a fixture snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageRecord {
    pub organization_id: String,
    pub entitlement_key: String,
    pub count: u64,
}

/// JSON snapshot used to seed an [`InMemoryStore`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub rules: Vec<OverrideRuleDefinition>,
    #[serde(default)]
    pub usage: Vec<UsageRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    subscriptions: RwLock<HashMap<String, Subscription>>,
    registry: RwLock<OverrideRegistry>,
    usage: RwLock<HashMap<(String, String), u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a fixture. Fails if any rule is malformed.
    pub fn from_fixture(fixture: Fixture) -> Result<Self, RegistryError> {
        let registry = OverrideRegistry::from_definitions(fixture.rules)?;
        let subscriptions = fixture
            .subscriptions
            .into_iter()
            .map(|s| (s.organization_id.clone(), s))
            .collect::<HashMap<_, _>>();
        let usage = fixture
            .usage
            .into_iter()
            .map(|u| ((u.organization_id, u.entitlement_key), u.count))
            .collect::<HashMap<_, _>>();

        info!(
            subscriptions = subscriptions.len(),
            rules = registry.len(),
            counters = usage.len(),
            "in-memory store seeded"
        );

        Ok(Self {
            subscriptions: RwLock::new(subscriptions),
            registry: RwLock::new(registry),
            usage: RwLock::new(usage),
        })
    }

    pub fn from_fixture_json(raw: &str) -> anyhow::Result<Self> {
        let fixture: Fixture = serde_json::from_str(raw).context("invalid fixture JSON")?;
        Ok(Self::from_fixture(fixture)?)
    }

    pub fn from_fixture_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        Self::from_fixture_json(&raw)
    }

    pub async fn put_subscription(&self, subscription: Subscription) {
        let mut subs = self.subscriptions.write().await;
        subs.insert(subscription.organization_id.clone(), subscription);
    }

    pub async fn set_usage(&self, organization_id: &str, entitlement_key: &str, count: u64) {
        let mut usage = self.usage.write().await;
        usage.insert((organization_id.to_string(), entitlement_key.to_string()), count);
    }

    /// Swap in a new rule snapshot. A malformed definition rejects the whole
    /// snapshot and leaves the current one in place.
    pub async fn replace_rules(
        &self,
        definitions: Vec<OverrideRuleDefinition>,
    ) -> Result<(), RegistryError> {
        let next = OverrideRegistry::from_definitions(definitions)?;
        info!(rules = next.len(), "override registry replaced");
        *self.registry.write().await = next;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionProvider for InMemoryStore {
    async fn get_subscription(
        &self,
        organization_id: &str,
    ) -> anyhow::Result<Option<Subscription>> {
        Ok(self.subscriptions.read().await.get(organization_id).cloned())
    }
}

#[async_trait]
impl OverrideRegistryStore for InMemoryStore {
    async fn list_enabled_override_rules(&self) -> anyhow::Result<OverrideRegistry> {
        Ok(self.registry.read().await.clone())
    }
}

#[async_trait]
impl UsageCounterSource for InMemoryStore {
    async fn get_current_usage(
        &self,
        organization_id: &str,
        entitlement_key: &str,
    ) -> anyhow::Result<u64> {
        let usage = self.usage.read().await;
        Ok(usage
            .get(&(organization_id.to_string(), entitlement_key.to_string()))
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use complyr_core::plan::PlanTier;
    use complyr_core::subscription::SubscriptionStatus;

    const FIXTURE: &str = r#"{
        "subscriptions": [
            { "organization_id": "org_acme", "plan_tier": "pro", "status": "active" },
            {
                "organization_id": "org_trial",
                "plan_tier": "premium",
                "status": "trial_active",
                "trial_started_at": "2026-01-01T00:00:00Z",
                "trial_expires_at": "2026-01-15T00:00:00Z"
            }
        ],
        "rules": [
            { "feature_key": "interactive_gate", "capability_key": "interaction_blocks", "minimum_plan": "premium" },
            { "feature_key": "retired", "capability_key": "cms_access", "enabled": false }
        ],
        "usage": [
            { "organization_id": "org_acme", "entitlement_key": "published_records", "count": 42 }
        ]
    }"#;

    #[tokio::test]
    async fn fixture_seeds_all_three_stores() {
        let store = InMemoryStore::from_fixture_json(FIXTURE).unwrap();

        let acme = store.get_subscription("org_acme").await.unwrap().unwrap();
        assert_eq!(acme.plan_tier, PlanTier::Pro);
        assert_eq!(acme.status, SubscriptionStatus::Active);
        assert!(acme.trial_expires_at.is_none());

        let trial = store.get_subscription("org_trial").await.unwrap().unwrap();
        assert!(trial.trial_expires_at.is_some());

        assert!(store.get_subscription("org_missing").await.unwrap().is_none());

        let registry = store.list_enabled_override_rules().await.unwrap();
        assert_eq!(registry.len(), 1, "disabled rules are filtered by the store");

        assert_eq!(store.get_current_usage("org_acme", "published_records").await.unwrap(), 42);
        assert_eq!(store.get_current_usage("org_acme", "products").await.unwrap(), 0);
    }

    #[test]
    fn granting_rule_in_fixture_is_fatal() {
        let raw = r#"{ "rules": [ { "feature_key": "free_publish", "capability_key": "publishing", "effect": "grant" } ] }"#;
        let err = InMemoryStore::from_fixture_json(raw).err().unwrap();
        assert!(err.to_string().contains("override rules may only deny"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = InMemoryStore::from_fixture_json("{ not json").err().unwrap();
        assert!(err.to_string().contains("invalid fixture JSON"));
    }

    #[test]
    fn missing_fixture_file_is_reported() {
        let err = InMemoryStore::from_fixture_file("/nonexistent/complyr.json").err().unwrap();
        assert!(err.to_string().contains("failed to read fixture"));
    }

    #[tokio::test]
    async fn replace_rules_keeps_previous_snapshot_on_error() {
        let store = InMemoryStore::from_fixture_json(FIXTURE).unwrap();
        let bad = vec![OverrideRuleDefinition {
            feature_key: String::new(),
            capability_key: None,
            minimum_plan: "basic".to_string(),
            requires_active_subscription: false,
            requires_publishing: false,
            visible_in_trial: true,
            usable_in_trial: true,
            enabled: true,
            effect: Default::default(),
        }];
        assert!(store.replace_rules(bad).await.is_err());
        assert_eq!(store.list_enabled_override_rules().await.unwrap().len(), 1);

        store.replace_rules(Vec::new()).await.unwrap();
        assert!(store.list_enabled_override_rules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_are_visible_to_reads() {
        let store = InMemoryStore::new();
        store
            .put_subscription(Subscription {
                organization_id: "org_x".to_string(),
                plan_tier: PlanTier::Basic,
                status: SubscriptionStatus::PastDue,
                trial_started_at: None,
                trial_expires_at: None,
            })
            .await;
        store.set_usage("org_x", "team_members", 3).await;

        let sub = store.get_subscription("org_x").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
        assert_eq!(store.get_current_usage("org_x", "team_members").await.unwrap(), 3);
    }
}
