//! Concrete integrations for the Conduit automation registry.
//!
//! - [`platform`]: the host platform's visitors and accounts (always present)
//! - [`commerce`]: the commerce platform's carts, orders and customers
//!   (optional, probed at boot)
//!
//! [`build_registry`] wires both from configuration and freezes the result.

pub mod commerce;
pub mod platform;

use std::sync::Arc;

use conduit_automation::{BootReport, Integration, Registry, Result, bootstrap};
use conduit_config::ConduitConfig;

pub use commerce::{CommerceIntegration, CommercePlatform, StaticCommercePlatform};
pub use platform::PlatformIntegration;

/// The integrations described by a configuration, in boot order.
pub fn configured_integrations(config: &ConduitConfig) -> Vec<Box<dyn Integration>> {
    let platform = PlatformIntegration::new(config.platform().enabled);
    let commerce = CommerceIntegration::new(Arc::new(StaticCommercePlatform::from_config(
        &config.commerce(),
    )));
    vec![Box::new(platform), Box::new(commerce)]
}

/// Build, populate and freeze a registry from configuration.
pub fn build_registry(config: &ConduitConfig) -> Result<(Registry, BootReport)> {
    let registry = Registry::with_validation(config.registry().validation);
    let report = bootstrap(&registry, &configured_integrations(config))?;
    Ok((registry, report))
}
