//! The commerce platform integration.
//!
//! Registers only while the commerce platform is active. Components, in
//! registration order:
//!
//! - context factory `commerce`: currency, order statuses, payment and
//!   shipping methods
//! - subjects: abandoned cart, order, order status change, customer
//! - transformers: visitor → customer, order status change → order,
//!   order → customer, abandoned cart → visitor
//! - triggers: order status changed, cart abandoned

mod backend;
pub mod subjects;
pub mod transformers;
pub mod triggers;

use std::sync::Arc;

use conduit_automation::{
    AutomationError, ContextData, Integration, Registry, Result, SchemaSubject,
};
use serde_json::json;
use tracing::debug;

pub use backend::{CommercePlatform, Customer, Order, StaticCommercePlatform};
pub use subjects::{ABANDONED_CART, CUSTOMER, ORDER, ORDER_STATUS_CHANGE, OrderSubject};
pub use transformers::{
    AbandonedCartToVisitor, OrderStatusChangeToOrder, OrderToCustomer, VisitorToCustomer,
};
pub use triggers::{
    ANY_STATUS, CART_ABANDONED, CartAbandonedTrigger, ORDER_STATUS_CHANGED,
    OrderStatusChangedTrigger,
};

/// Integration name.
pub const NAME: &str = "commerce";

/// Snapshot of the platform's auxiliary data for workflow evaluation.
///
/// Fails when the platform went away after boot.
pub fn context_data(platform: &dyn CommercePlatform) -> Result<ContextData> {
    if !platform.is_active() {
        return Err(AutomationError::context_factory(
            NAME,
            "commerce platform is not active",
        ));
    }

    let mut data = ContextData::new();
    data.insert("currency".into(), json!(platform.currency()));
    data.insert("order_statuses".into(), json!(platform.order_statuses()));
    data.insert("payment_methods".into(), json!(platform.payment_methods()));
    data.insert("shipping_methods".into(), json!(platform.shipping_methods()));
    debug!(integration = NAME, "Built commerce context");
    Ok(data)
}

pub struct CommerceIntegration {
    platform: Arc<dyn CommercePlatform>,
}

impl CommerceIntegration {
    pub fn new(platform: Arc<dyn CommercePlatform>) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &Arc<dyn CommercePlatform> {
        &self.platform
    }
}

impl Integration for CommerceIntegration {
    fn name(&self) -> &str {
        NAME
    }

    fn is_available(&self) -> bool {
        self.platform.is_active()
    }

    fn register_components(&self, registry: &Registry) -> Result<()> {
        let platform = self.platform.clone();
        registry.register_context_factory(NAME, move || context_data(platform.as_ref()))?;

        registry.register_subject(SchemaSubject::new(subjects::abandoned_cart_kind()))?;
        registry.register_subject(OrderSubject::new(self.platform.clone()))?;
        registry.register_subject(SchemaSubject::new(subjects::order_status_change_kind()))?;
        registry.register_subject(SchemaSubject::new(subjects::customer_kind()))?;

        registry.register_transformer(VisitorToCustomer::new(self.platform.clone()))?;
        registry.register_transformer(OrderStatusChangeToOrder::new(self.platform.clone()))?;
        registry.register_transformer(OrderToCustomer::new(self.platform.clone()))?;
        registry.register_transformer(AbandonedCartToVisitor)?;

        registry.register_trigger(OrderStatusChangedTrigger::new())?;
        registry.register_trigger(CartAbandonedTrigger::new())?;
        Ok(())
    }
}
