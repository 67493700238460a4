//! Commerce subject kinds.

use std::sync::Arc;

use conduit_automation::{
    ArgumentSchema, ArgumentType, Payload, Result, Subject, SubjectInstance, SubjectKind,
};
use serde_json::Value;

use super::backend::CommercePlatform;

pub const ABANDONED_CART: &str = "commerce.abandoned_cart";
pub const ORDER: &str = "commerce.order";
pub const ORDER_STATUS_CHANGE: &str = "commerce.order_status_change";
pub const CUSTOMER: &str = "commerce.customer";

pub fn abandoned_cart_kind() -> SubjectKind {
    SubjectKind::new(
        ABANDONED_CART,
        ArgumentSchema::new()
            .required("cart_id", ArgumentType::String)
            .required("session_id", ArgumentType::String)
            .optional("account_id", ArgumentType::Integer)
            .required("product_ids", ArgumentType::List)
            .required("total", ArgumentType::Number)
            .required("last_activity_at", ArgumentType::DateTime),
    )
    .with_name("Abandoned cart")
}

pub fn order_kind() -> SubjectKind {
    SubjectKind::new(
        ORDER,
        ArgumentSchema::new()
            .required("order_id", ArgumentType::Integer)
            .optional("customer_id", ArgumentType::Integer)
            .required("total", ArgumentType::Number)
            .required("currency", ArgumentType::String),
    )
    .with_name("Order")
}

pub fn order_status_change_kind() -> SubjectKind {
    SubjectKind::new(
        ORDER_STATUS_CHANGE,
        ArgumentSchema::new()
            .required("order_id", ArgumentType::Integer)
            .required("from", ArgumentType::String)
            .required("to", ArgumentType::String),
    )
    .with_name("Order status change")
}

pub fn customer_kind() -> SubjectKind {
    SubjectKind::new(
        CUSTOMER,
        ArgumentSchema::new()
            .required("customer_id", ArgumentType::Integer)
            .optional("account_id", ArgumentType::Integer)
            .optional("email", ArgumentType::String),
    )
    .with_name("Customer")
}

/// Order subject. Payloads without a currency are in the store currency.
pub struct OrderSubject {
    kind: SubjectKind,
    platform: Arc<dyn CommercePlatform>,
}

impl OrderSubject {
    pub fn new(platform: Arc<dyn CommercePlatform>) -> Self {
        Self {
            kind: order_kind(),
            platform,
        }
    }
}

impl Subject for OrderSubject {
    fn kind(&self) -> &SubjectKind {
        &self.kind
    }

    fn extract(&self, payload: &Payload) -> Result<SubjectInstance> {
        let mut payload = payload.clone();
        if payload.get("currency").is_none_or(Value::is_null) {
            payload.insert(
                "currency".to_string(),
                Value::String(self.platform.currency().to_string()),
            );
        }
        let args = self.kind.schema().extract(ORDER, &payload)?;
        Ok(SubjectInstance::new(ORDER, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commerce::StaticCommercePlatform;
    use conduit_automation::SchemaSubject;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_order_defaults_to_store_currency() {
        let subject = OrderSubject::new(Arc::new(StaticCommercePlatform::new("EUR")));
        let order = subject
            .extract(&payload(json!({"order_id": 1, "total": 10.0})))
            .unwrap();
        assert_eq!(order.get_str("currency"), Some("EUR"));

        let order = subject
            .extract(&payload(json!({"order_id": 1, "total": 10.0, "currency": "GBP"})))
            .unwrap();
        assert_eq!(order.get_str("currency"), Some("GBP"));
    }

    #[test]
    fn test_abandoned_cart_requires_timestamp() {
        let subject = SchemaSubject::new(abandoned_cart_kind());
        let base = json!({
            "cart_id": "c-1",
            "session_id": "s-1",
            "product_ids": [1, 2],
            "total": 12.5,
        });

        assert!(subject.extract(&payload(base.clone())).is_err());

        let mut with_time = payload(base);
        with_time.insert("last_activity_at".into(), json!("2024-05-01T10:00:00Z"));
        let cart = subject.extract(&with_time).unwrap();
        assert!(cart.get("account_id").is_none());
    }
}
