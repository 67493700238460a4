//! Commerce triggers.

use chrono::{DateTime, Duration, Utc};
use conduit_automation::{Payload, SubjectInstance, Trigger, TriggerDefinition};
use tracing::trace;

use super::subjects::{ABANDONED_CART, ORDER_STATUS_CHANGE};

pub const ORDER_STATUS_CHANGED: &str = "commerce.order_status_changed";
pub const CART_ABANDONED: &str = "commerce.cart_abandoned";

/// Step argument value matching every status.
pub const ANY_STATUS: &str = "any";

/// Minutes of inactivity before a cart counts as abandoned, unless the
/// step sets `wait_minutes`.
pub const DEFAULT_WAIT_MINUTES: i64 = 30;

/// Fires when an order moves between statuses.
///
/// Steps narrow it with `from` and `to` step arguments; a missing argument
/// or [`ANY_STATUS`] matches every status. Events that do not actually
/// change the status never fire.
#[derive(Debug, Clone)]
pub struct OrderStatusChangedTrigger {
    definition: TriggerDefinition,
}

impl OrderStatusChangedTrigger {
    pub fn new() -> Self {
        Self {
            definition: TriggerDefinition::new(ORDER_STATUS_CHANGED, ORDER_STATUS_CHANGE)
                .with_name("Order status changed")
                .with_description("An order moved from one status to another"),
        }
    }
}

impl Default for OrderStatusChangedTrigger {
    fn default() -> Self {
        Self::new()
    }
}

fn status_matches(step_args: &Payload, name: &str, actual: &str) -> bool {
    match step_args.get(name).and_then(|v| v.as_str()) {
        None | Some(ANY_STATUS) => true,
        Some(expected) => expected == actual,
    }
}

impl Trigger for OrderStatusChangedTrigger {
    fn definition(&self) -> &TriggerDefinition {
        &self.definition
    }

    fn is_triggered_by(&self, step_args: &Payload, subject: &SubjectInstance) -> bool {
        let (Some(from), Some(to)) = (subject.get_str("from"), subject.get_str("to")) else {
            return false;
        };
        if from == to {
            trace!(status = %from, "Order status unchanged");
            return false;
        }
        status_matches(step_args, "from", from) && status_matches(step_args, "to", to)
    }
}

/// Fires for carts idle for at least `wait_minutes`.
#[derive(Debug, Clone)]
pub struct CartAbandonedTrigger {
    definition: TriggerDefinition,
}

impl CartAbandonedTrigger {
    pub fn new() -> Self {
        Self {
            definition: TriggerDefinition::new(CART_ABANDONED, ABANDONED_CART)
                .with_name("Cart abandoned")
                .with_description("A cart with products saw no activity for a while"),
        }
    }
}

impl Default for CartAbandonedTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Trigger for CartAbandonedTrigger {
    fn definition(&self) -> &TriggerDefinition {
        &self.definition
    }

    fn is_triggered_by(&self, step_args: &Payload, subject: &SubjectInstance) -> bool {
        let wait = step_args
            .get("wait_minutes")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_WAIT_MINUTES);

        let Some(last_activity) = subject
            .get_str("last_activity_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        else {
            return false;
        };

        let Some(wait) = Duration::try_minutes(wait) else {
            return false;
        };
        let idle = Utc::now().signed_duration_since(last_activity.with_timezone(&Utc));
        idle >= wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn map(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn change(from: &str, to: &str) -> SubjectInstance {
        SubjectInstance::new(
            ORDER_STATUS_CHANGE,
            map(json!({"order_id": 1, "from": from, "to": to})),
        )
    }

    #[test]
    fn test_status_filters() {
        let trigger = OrderStatusChangedTrigger::new();
        let event = change("pending", "completed");

        assert!(trigger.is_triggered_by(&Payload::new(), &event));
        assert!(trigger.is_triggered_by(&map(json!({"from": "any", "to": "completed"})), &event));
        assert!(trigger.is_triggered_by(&map(json!({"from": "pending"})), &event));
        assert!(!trigger.is_triggered_by(&map(json!({"to": "cancelled"})), &event));
        assert!(!trigger.is_triggered_by(&map(json!({"from": "processing", "to": "any"})), &event));
    }

    #[test]
    fn test_unchanged_status_never_fires() {
        let trigger = OrderStatusChangedTrigger::new();
        assert!(!trigger.is_triggered_by(&Payload::new(), &change("pending", "pending")));
    }

    fn cart(minutes_ago: i64) -> SubjectInstance {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        SubjectInstance::new(
            ABANDONED_CART,
            map(json!({"cart_id": "c", "last_activity_at": at.to_rfc3339()})),
        )
    }

    #[test]
    fn test_cart_wait_time() {
        let trigger = CartAbandonedTrigger::new();
        assert!(trigger.is_triggered_by(&Payload::new(), &cart(45)));
        assert!(!trigger.is_triggered_by(&Payload::new(), &cart(5)));
        assert!(trigger.is_triggered_by(&map(json!({"wait_minutes": 1})), &cart(5)));
        assert!(!trigger.is_triggered_by(&map(json!({"wait_minutes": 120})), &cart(45)));
    }

    #[test]
    fn test_cart_without_timestamp_never_fires() {
        let trigger = CartAbandonedTrigger::new();
        let subject = SubjectInstance::new(ABANDONED_CART, Payload::new());
        assert!(!trigger.is_triggered_by(&Payload::new(), &subject));
    }
}
