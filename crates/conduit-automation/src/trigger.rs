//! Triggers: event sources that fire with a specific subject kind.

use serde::Serialize;

use crate::subject::{Payload, SubjectInstance};

/// Static description of a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerDefinition {
    /// Globally unique identifier, e.g. `"shop.order_status_changed"`.
    pub id: String,
    /// Identifier of the subject kind this trigger emits.
    pub subject: String,
    /// Human-readable name shown in workflow pickers.
    pub name: String,
    /// Longer description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl TriggerDefinition {
    /// Create a definition. The name defaults to the identifier.
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            subject: subject.into(),
            description: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An event source registered with the registry.
pub trait Trigger: Send + Sync {
    /// The trigger's static definition.
    fn definition(&self) -> &TriggerDefinition;

    /// Whether an emitted subject satisfies the trigger's watched condition
    /// for a workflow step configured with `step_args`.
    ///
    /// The default accepts every event.
    fn is_triggered_by(&self, step_args: &Payload, subject: &SubjectInstance) -> bool {
        let _ = (step_args, subject);
        true
    }
}

/// A trigger with no watched condition beyond its event.
#[derive(Debug, Clone)]
pub struct EventTrigger {
    definition: TriggerDefinition,
}

impl EventTrigger {
    pub fn new(definition: TriggerDefinition) -> Self {
        Self { definition }
    }
}

impl Trigger for EventTrigger {
    fn definition(&self) -> &TriggerDefinition {
        &self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = TriggerDefinition::new("shop.cart_abandoned", "shop.cart")
            .with_name("Cart abandoned")
            .with_description("Fires when a cart sits idle");
        assert_eq!(def.id, "shop.cart_abandoned");
        assert_eq!(def.subject, "shop.cart");
        assert_eq!(def.name, "Cart abandoned");
    }

    #[test]
    fn test_event_trigger_accepts_everything() {
        let trigger = EventTrigger::new(TriggerDefinition::new("a.fired", "a.thing"));
        let subject = SubjectInstance::new("a.thing", Payload::new());
        assert!(trigger.is_triggered_by(&Payload::new(), &subject));
    }

    #[test]
    fn test_definition_serialization_skips_empty_description() {
        let def = TriggerDefinition::new("a.fired", "a.thing");
        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["subject"], "a.thing");
    }
}
