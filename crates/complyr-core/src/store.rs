//! Collaborator interfaces the engine reads from.
//!
//! All three are read-only from the engine's point of view. Implementations
//! are injected as `Arc<dyn _>` so deployments can swap an in-memory store for
//! a database-backed one without touching the engine.

use async_trait::async_trait;

use crate::rules::OverrideRegistry;
use crate::subscription::Subscription;

/// Subscription state provider.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync + 'static {
    /// `Ok(None)` for an organization with no subscription record yet.
    async fn get_subscription(
        &self,
        organization_id: &str,
    ) -> anyhow::Result<Option<Subscription>>;
}

/// Override registry store.
#[async_trait]
pub trait OverrideRegistryStore: Send + Sync + 'static {
    /// Snapshot of the enabled, linted rules. An empty registry is valid.
    async fn list_enabled_override_rules(&self) -> anyhow::Result<OverrideRegistry>;
}

/// Usage counter source.
#[async_trait]
pub trait UsageCounterSource: Send + Sync + 'static {
    async fn get_current_usage(
        &self,
        organization_id: &str,
        entitlement_key: &str,
    ) -> anyhow::Result<u64>;
}

/// Registry with no rules; base capabilities apply unmodified.
pub struct NoOverrides;

#[async_trait]
impl OverrideRegistryStore for NoOverrides {
    async fn list_enabled_override_rules(&self) -> anyhow::Result<OverrideRegistry> {
        Ok(OverrideRegistry::empty())
    }
}

/// Usage source that reports zero for every counter.
pub struct ZeroUsage;

#[async_trait]
impl UsageCounterSource for ZeroUsage {
    async fn get_current_usage(
        &self,
        _organization_id: &str,
        _entitlement_key: &str,
    ) -> anyhow::Result<u64> {
        Ok(0)
    }
}
