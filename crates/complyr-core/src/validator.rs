//! Publish-time validation of a content document.
//!
//! Every problem is collected before returning; the caller either accepts the
//! whole document or refuses the attempt with the full list.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::blocks::{styling_schema, BlockCatalog, BlockTypeSpec};
use crate::capability::{CapabilityKey, ResolvedCapabilities};
use crate::content::{ContentBlock, ContentDocument};
use crate::plan::PlanTier;
use crate::rules::{DenyReason, OverrideRegistry};
use crate::subscription::Subscription;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Inputs a publish check is evaluated against. Capabilities must be freshly
/// resolved for `subscription` with `registry`.
pub struct PublishContext<'a> {
    pub subscription: &'a Subscription,
    pub capabilities: &'a ResolvedCapabilities,
    pub registry: &'a OverrideRegistry,
    pub catalog: &'a BlockCatalog,
}

/// Check `document` before it may be marked published.
pub fn validate_for_publishing(
    document: &ContentDocument,
    ctx: &PublishContext<'_>,
) -> ValidationResult {
    if !ctx.capabilities.get(CapabilityKey::Publishing) {
        return ValidationResult::from_parts(
            vec![format!(
                "publishing is not available for this organization (plan: {}, status: {})",
                ctx.subscription.plan_tier,
                ctx.subscription.status.as_str()
            )],
            Vec::new(),
        );
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if document.blocks.is_empty() {
        warnings.push("document has no content blocks".to_string());
    }

    check_uniqueness(&document.blocks, &mut errors);

    let styling_allowed = ctx.capabilities.get(CapabilityKey::StylingControls);
    let styling = styling_schema();

    for block in &document.blocks {
        let spec = ctx.catalog.get(&block.block_type);
        match spec {
            Some(spec) => {
                if let Some(message) = availability_error(spec, ctx) {
                    errors.push(format!("block '{}': {message}", block.id));
                }
            }
            None => errors.push(format!(
                "block '{}': unknown block type '{}'",
                block.id, block.block_type
            )),
        }

        if let Some(block_styling) = &block.styling {
            if styling_allowed {
                styling.check(block_styling, &format!("{}.styling", block.id), &mut errors);
            } else {
                errors.push(format!(
                    "block '{}': styling requires the styling_controls capability",
                    block.id
                ));
            }
        }

        // Content shape is only known for catalogued types.
        if let Some(spec) = spec {
            spec.schema
                .check(&block.content, &format!("{}.content", block.id), &mut errors);
        }
    }

    if let Some(doc_styling) = &document.styling {
        if styling_allowed {
            styling.check(doc_styling, "styling", &mut errors);
        } else {
            errors.push("document styling requires the styling_controls capability".to_string());
        }
    }

    ValidationResult::from_parts(errors, warnings)
}

fn check_uniqueness(blocks: &[ContentBlock], errors: &mut Vec<String>) {
    let mut ids: BTreeMap<&str, usize> = BTreeMap::new();
    let mut orders: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for block in blocks {
        *ids.entry(block.id.as_str()).or_default() += 1;
        orders.entry(block.order).or_default().push(block.id.as_str());
    }

    for (id, count) in ids {
        if count > 1 {
            errors.push(format!("duplicate block id '{id}' ({count} blocks)"));
        }
    }
    for (order, holders) in orders {
        if holders.len() > 1 {
            errors.push(format!(
                "duplicate block order {order} (blocks {})",
                holders
                    .iter()
                    .map(|id| format!("'{id}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
    }
}

/// One message when the organization may not use `spec`, otherwise `None`.
fn availability_error(spec: &BlockTypeSpec, ctx: &PublishContext<'_>) -> Option<String> {
    let tier = ctx.subscription.plan_tier;
    let publishing = ctx.capabilities.get(CapabilityKey::Publishing);
    let rule_denial = ctx
        .registry
        .feature_denied(&spec.feature_key(), ctx.subscription, publishing);

    let mut required: PlanTier = spec.minimum_plan;
    if let Some(DenyReason::BelowMinimumPlan { required: rule_plan }) = rule_denial {
        required = required.max(rule_plan);
    }

    let capability_denied = !ctx.capabilities.get(spec.capability);
    let plan_denied = !tier.satisfies(required);
    if !capability_denied && !plan_denied && rule_denial.is_none() {
        return None;
    }

    let detail = match rule_denial {
        Some(DenyReason::RequiresActiveSubscription) if !plan_denied => {
            "requires an active subscription".to_string()
        }
        Some(DenyReason::RequiresPublishing) if !plan_denied => {
            "requires the publishing capability".to_string()
        }
        Some(DenyReason::HiddenInTrial | DenyReason::UnusableInTrial) if !plan_denied => {
            "not available during the trial".to_string()
        }
        None if !plan_denied => format!("requires the {} capability", spec.capability),
        _ => format!("requires {required} plan"),
    };
    Some(format!(
        "block type '{}' not available, upgrade required ({detail})",
        spec.type_key
    ))
}
