//! Integrations: optional bundles of components tied to one external system.
//!
//! Each integration probes its dependency first. When the dependency is
//! inactive, registration is a successful no-op; integrations are optional.
//! When active, it registers its context factory, subjects, transformers and
//! triggers, using identifiers namespaced as `<integration>.<local>`.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::registry::Registry;

/// Build a namespaced identifier: `qualified_id("shop", "order") == "shop.order"`.
pub fn qualified_id(integration: &str, local: &str) -> String {
    format!("{}.{}", integration, local)
}

/// The integration prefix of a namespaced identifier, if it has one.
pub fn integration_of(id: &str) -> Option<&str> {
    id.split_once('.').map(|(integration, _)| integration)
}

/// What [`Integration::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered,
    /// The capability check failed; nothing was registered.
    Skipped,
}

/// A bundle of components for one external system.
pub trait Integration: Send + Sync {
    /// Integration name, used as the identifier namespace and context factory id.
    fn name(&self) -> &str;

    /// Capability check: whether the wrapped system is active.
    fn is_available(&self) -> bool;

    /// Register every component. Only called when [`Integration::is_available`]
    /// returned true.
    fn register_components(&self, registry: &Registry) -> Result<()>;

    /// Probe the dependency and register when it is active.
    fn register(&self, registry: &Registry) -> Result<RegistrationOutcome> {
        if !self.is_available() {
            info!(integration = %self.name(), "Integration unavailable, skipping");
            return Ok(RegistrationOutcome::Skipped);
        }

        self.register_components(registry)?;
        debug!(integration = %self.name(), "Integration registered");
        Ok(RegistrationOutcome::Registered)
    }
}

/// Which integrations took part in a boot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootReport {
    pub registered: Vec<String>,
    pub skipped: Vec<String>,
}

/// Register every integration in order, then mark the registry ready.
///
/// The first error aborts the boot; configuration defects must not leave a
/// half-registered registry in service.
pub fn bootstrap(registry: &Registry, integrations: &[Box<dyn Integration>]) -> Result<BootReport> {
    let mut report = BootReport::default();

    for integration in integrations {
        match integration.register(registry)? {
            RegistrationOutcome::Registered => report.registered.push(integration.name().to_string()),
            RegistrationOutcome::Skipped => report.skipped.push(integration.name().to_string()),
        }
    }

    registry.mark_ready()?;
    info!(
        registered = ?report.registered,
        skipped = ?report.skipped,
        "Automation registry booted"
    );
    Ok(report)
}
