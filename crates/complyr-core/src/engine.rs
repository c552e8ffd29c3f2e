//! Engine facade over the collaborator stores.
//!
//! Each call re-reads the stores and runs the pure pipeline on the snapshot it
//! got back. Nothing is cached between calls and nothing is written, so the
//! engine can be shared freely across concurrent requests.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::blocks::BlockCatalog;
use crate::capability::{CapabilityKey, ResolvedCapabilities};
use crate::content::ContentDocument;
use crate::entitlement::{
    default_entitlements, evaluate_usage, EntitlementDefinition, EntitlementUsage,
};
use crate::error::CoreError;
use crate::resolver::resolve_capabilities_with_registry;
use crate::store::{OverrideRegistryStore, SubscriptionProvider, UsageCounterSource};
use crate::subscription::{clamp_trial_days, Subscription, DEFAULT_TRIAL_DAYS};
use crate::validator::{validate_for_publishing, PublishContext, ValidationResult};

/// Subscription snapshot together with the capabilities resolved from it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub subscription: Subscription,
    pub capabilities: ResolvedCapabilities,
}

pub struct EntitlementEngine {
    subscriptions: Arc<dyn SubscriptionProvider>,
    registry: Arc<dyn OverrideRegistryStore>,
    usage: Arc<dyn UsageCounterSource>,
    catalog: BlockCatalog,
    entitlements: Vec<EntitlementDefinition>,
    trial_days: i64,
}

impl EntitlementEngine {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionProvider>,
        registry: Arc<dyn OverrideRegistryStore>,
        usage: Arc<dyn UsageCounterSource>,
    ) -> Self {
        Self {
            subscriptions,
            registry,
            usage,
            catalog: BlockCatalog::default(),
            entitlements: default_entitlements(),
            trial_days: DEFAULT_TRIAL_DAYS,
        }
    }

    pub fn with_trial_days(mut self, trial_days: i64) -> Self {
        self.trial_days = clamp_trial_days(trial_days);
        self
    }

    pub fn with_catalog(mut self, catalog: BlockCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_entitlements(mut self, entitlements: Vec<EntitlementDefinition>) -> Self {
        self.entitlements = entitlements;
        self
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Stored subscription, or a synthetic Premium trial when none exists.
    pub async fn subscription_for(
        &self,
        organization_id: &str,
    ) -> Result<Subscription, CoreError> {
        match self.subscriptions.get_subscription(organization_id).await? {
            Some(subscription) => Ok(subscription),
            None => {
                debug!(organization_id, "no subscription record, using default trial");
                Ok(Subscription::default_for(
                    organization_id,
                    Utc::now(),
                    self.trial_days,
                ))
            }
        }
    }

    /// Full pipeline for `organization_id` against the current registry.
    pub async fn resolution_for(&self, organization_id: &str) -> Result<Resolution, CoreError> {
        let subscription = self.subscription_for(organization_id).await?;
        let registry = self.registry.list_enabled_override_rules().await?;
        let capabilities = resolve_capabilities_with_registry(&subscription, &registry);
        Ok(Resolution {
            subscription,
            capabilities,
        })
    }

    pub async fn capabilities_for(
        &self,
        organization_id: &str,
    ) -> Result<ResolvedCapabilities, CoreError> {
        Ok(self.resolution_for(organization_id).await?.capabilities)
    }

    pub async fn has_capability(
        &self,
        organization_id: &str,
        key: CapabilityKey,
    ) -> Result<bool, CoreError> {
        Ok(self.capabilities_for(organization_id).await?.get(key))
    }

    /// Usage report for every entitlement in the catalog.
    pub async fn evaluate_entitlements(
        &self,
        organization_id: &str,
    ) -> Result<Vec<EntitlementUsage>, CoreError> {
        let subscription = self.subscription_for(organization_id).await?;
        let mut report = Vec::with_capacity(self.entitlements.len());
        for definition in &self.entitlements {
            let current = self
                .usage
                .get_current_usage(organization_id, &definition.key)
                .await?;
            report.push(evaluate_usage(definition, subscription.plan_tier, current));
        }
        Ok(report)
    }

    /// Validate `document` for publishing.
    ///
    /// Capabilities are resolved here, right before validating, rather than
    /// taken from earlier in the request.
    pub async fn validate_content_for_publishing(
        &self,
        document: &ContentDocument,
        organization_id: &str,
    ) -> Result<ValidationResult, CoreError> {
        let subscription = self.subscription_for(organization_id).await?;
        let registry = self.registry.list_enabled_override_rules().await?;
        let capabilities = resolve_capabilities_with_registry(&subscription, &registry);

        let result = validate_for_publishing(
            document,
            &PublishContext {
                subscription: &subscription,
                capabilities: &capabilities,
                registry: &registry,
                catalog: &self.catalog,
            },
        );
        if !result.valid {
            warn!(
                organization_id,
                error_count = result.errors.len(),
                "publish validation rejected document"
            );
        }
        Ok(result)
    }
}
