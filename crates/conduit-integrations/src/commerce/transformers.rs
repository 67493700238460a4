//! Conversions into and between commerce subjects.
//!
//! ```text
//! abandoned_cart ──► platform.visitor ──► customer
//! order_status_change ──► order ──► customer
//! ```

use std::sync::Arc;

use conduit_automation::{Payload, SubjectInstance, SubjectTransformer, TransformFailure};
use serde_json::json;

use super::backend::{CommercePlatform, Customer};
use super::subjects::{ABANDONED_CART, CUSTOMER, ORDER, ORDER_STATUS_CHANGE};
use crate::platform::VISITOR;

type TransformResult = std::result::Result<SubjectInstance, TransformFailure>;

fn customer_instance(customer: &Customer) -> SubjectInstance {
    let mut args = Payload::new();
    args.insert("customer_id".into(), json!(customer.customer_id));
    if let Some(account_id) = customer.account_id {
        args.insert("account_id".into(), json!(account_id));
    }
    args.insert("email".into(), json!(customer.email));
    SubjectInstance::new(CUSTOMER, args)
}

fn require_i64(subject: &SubjectInstance, name: &str) -> std::result::Result<i64, TransformFailure> {
    subject
        .get_i64(name)
        .ok_or_else(|| TransformFailure::missing_argument(name))
}

/// Signed-in visitor to the customer linked to their account.
///
/// Every account is a customer. Accounts without a stored customer record
/// convert to a customer keyed by the account id, carrying the visitor's
/// email when known. Anonymous visitors cannot be converted.
pub struct VisitorToCustomer {
    platform: Arc<dyn CommercePlatform>,
}

impl VisitorToCustomer {
    pub fn new(platform: Arc<dyn CommercePlatform>) -> Self {
        Self { platform }
    }
}

impl SubjectTransformer for VisitorToCustomer {
    fn source(&self) -> &str {
        VISITOR
    }

    fn target(&self) -> &str {
        CUSTOMER
    }

    fn transform(&self, subject: &SubjectInstance) -> TransformResult {
        let account_id = subject
            .get_i64("account_id")
            .ok_or_else(|| TransformFailure::new("visitor is not signed in to an account"))?;
        if let Some(customer) = self.platform.find_customer_by_account(account_id) {
            return Ok(customer_instance(&customer));
        }

        let mut args = Payload::new();
        args.insert("customer_id".into(), json!(account_id));
        args.insert("account_id".into(), json!(account_id));
        if let Some(email) = subject.get_str("email") {
            args.insert("email".into(), json!(email));
        }
        Ok(SubjectInstance::new(CUSTOMER, args))
    }
}

/// Status change event to the order it concerns.
pub struct OrderStatusChangeToOrder {
    platform: Arc<dyn CommercePlatform>,
}

impl OrderStatusChangeToOrder {
    pub fn new(platform: Arc<dyn CommercePlatform>) -> Self {
        Self { platform }
    }
}

impl SubjectTransformer for OrderStatusChangeToOrder {
    fn source(&self) -> &str {
        ORDER_STATUS_CHANGE
    }

    fn target(&self) -> &str {
        ORDER
    }

    fn transform(&self, subject: &SubjectInstance) -> TransformResult {
        let order_id = require_i64(subject, "order_id")?;
        let order = self
            .platform
            .find_order(order_id)
            .ok_or_else(|| TransformFailure::new(format!("order {} not found", order_id)))?;

        let mut args = Payload::new();
        args.insert("order_id".into(), json!(order.order_id));
        if let Some(customer_id) = order.customer_id {
            args.insert("customer_id".into(), json!(customer_id));
        }
        args.insert("total".into(), json!(order.total));
        args.insert("currency".into(), json!(self.platform.currency()));
        Ok(SubjectInstance::new(ORDER, args))
    }
}

/// Order to the customer who placed it. Guest orders have none.
pub struct OrderToCustomer {
    platform: Arc<dyn CommercePlatform>,
}

impl OrderToCustomer {
    pub fn new(platform: Arc<dyn CommercePlatform>) -> Self {
        Self { platform }
    }
}

impl SubjectTransformer for OrderToCustomer {
    fn source(&self) -> &str {
        ORDER
    }

    fn target(&self) -> &str {
        CUSTOMER
    }

    fn transform(&self, subject: &SubjectInstance) -> TransformResult {
        let customer_id = subject
            .get_i64("customer_id")
            .ok_or_else(|| TransformFailure::new("guest order has no customer"))?;
        let customer = self.platform.find_customer(customer_id).ok_or_else(|| {
            TransformFailure::new(format!("customer {} not found", customer_id))
        })?;
        Ok(customer_instance(&customer))
    }
}

/// Abandoned cart to the visitor session that left it.
#[derive(Debug, Default)]
pub struct AbandonedCartToVisitor;

impl SubjectTransformer for AbandonedCartToVisitor {
    fn source(&self) -> &str {
        ABANDONED_CART
    }

    fn target(&self) -> &str {
        VISITOR
    }

    fn transform(&self, subject: &SubjectInstance) -> TransformResult {
        let session_id = subject
            .get("session_id")
            .cloned()
            .ok_or_else(|| TransformFailure::missing_argument("session_id"))?;

        let mut args = Payload::new();
        args.insert("session_id".into(), session_id);
        if let Some(account_id) = subject.get("account_id") {
            args.insert("account_id".into(), account_id.clone());
        }
        Ok(SubjectInstance::new(VISITOR, args))
    }
}
