pub mod blocks;
pub mod capability;
pub mod config;
pub mod content;
pub mod engine;
pub mod entitlement;
pub mod error;
pub mod plan;
pub mod resolver;
pub mod rules;
pub mod schema;
pub mod store;
pub mod subscription;
pub mod validator;

pub use capability::{CapabilityKey, ResolvedCapabilities};
pub use engine::EntitlementEngine;
pub use plan::PlanTier;
pub use resolver::{resolve_capabilities, resolve_capabilities_with_registry};
pub use subscription::{Subscription, SubscriptionStatus};
