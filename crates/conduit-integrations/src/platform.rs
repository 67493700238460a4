//! The host platform integration: site visitors and their accounts.
//!
//! The host platform is always present, so this integration only reports
//! itself unavailable when switched off in configuration. Other
//! integrations convert from its visitor subject, so disabling it while they
//! are active fails the registry integrity check.

use conduit_automation::{
    ArgumentSchema, ArgumentType, EventTrigger, Integration, Registry, Result, SchemaSubject,
    SubjectKind, TriggerDefinition,
};

/// Integration name.
pub const NAME: &str = "platform";

/// A (possibly anonymous) site visitor.
pub const VISITOR: &str = "platform.visitor";

/// Fires when a visitor signs up for an account.
pub const ACCOUNT_REGISTERED: &str = "platform.account_registered";

/// Subject kind of a site visitor.
///
/// `account_id` is present only for visitors signed in to an account.
pub fn visitor_kind() -> SubjectKind {
    SubjectKind::new(
        VISITOR,
        ArgumentSchema::new()
            .required("session_id", ArgumentType::String)
            .optional("account_id", ArgumentType::Integer)
            .optional("email", ArgumentType::String),
    )
    .with_name("Visitor")
}

#[derive(Debug, Clone)]
pub struct PlatformIntegration {
    enabled: bool,
}

impl PlatformIntegration {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for PlatformIntegration {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Integration for PlatformIntegration {
    fn name(&self) -> &str {
        NAME
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    fn register_components(&self, registry: &Registry) -> Result<()> {
        registry.register_subject(SchemaSubject::new(visitor_kind()))?;
        registry.register_trigger(EventTrigger::new(
            TriggerDefinition::new(ACCOUNT_REGISTERED, VISITOR)
                .with_name("Account registered")
                .with_description("A visitor created an account on the site"),
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_automation::{Payload, RegistrationOutcome};
    use serde_json::json;

    #[test]
    fn test_registers_visitor_and_trigger() {
        let registry = Registry::new();
        let outcome = PlatformIntegration::default().register(&registry).unwrap();
        assert_eq!(outcome, RegistrationOutcome::Registered);
        registry.mark_ready().unwrap();

        assert_eq!(registry.subjects_for_integration(NAME).len(), 1);
        assert_eq!(
            registry.resolve_trigger(ACCOUNT_REGISTERED).unwrap().definition().subject,
            VISITOR
        );
    }

    #[test]
    fn test_disabled_registers_nothing() {
        let registry = Registry::new();
        let outcome = PlatformIntegration::new(false).register(&registry).unwrap();
        assert_eq!(outcome, RegistrationOutcome::Skipped);
        assert!(registry.catalog().is_empty());
    }

    #[test]
    fn test_account_registered_fires_visitor() {
        let registry = Registry::new();
        PlatformIntegration::default().register(&registry).unwrap();
        registry.mark_ready().unwrap();

        let payload = match json!({"session_id": "abc", "account_id": 42, "email": "ada@example.com"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let visitor = registry
            .fire(ACCOUNT_REGISTERED, &payload, &Payload::new())
            .unwrap()
            .unwrap();
        assert_eq!(visitor.kind, VISITOR);
        assert_eq!(visitor.get_i64("account_id"), Some(42));
    }
}
