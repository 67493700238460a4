//! Serializable snapshot of what a registry offers.
//!
//! Used by workflow editors to populate pickers: which triggers exist, what
//! subject each emits, and which conversions are available.

use serde::Serialize;

use crate::integration::integration_of;
use crate::registry::Registry;
use crate::subject::ArgumentSpec;
use crate::trigger::TriggerDefinition;

/// A subject kind as shown in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    pub arguments: Vec<ArgumentSpec>,
}

/// A transformer edge as shown in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformerSummary {
    pub source: String,
    pub target: String,
}

/// Everything registered, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub subjects: Vec<SubjectSummary>,
    pub triggers: Vec<TriggerDefinition>,
    pub transformers: Vec<TransformerSummary>,
    pub context_factories: Vec<String>,
}

impl Catalog {
    /// Take a snapshot of a registry.
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            subjects: registry
                .subjects()
                .iter()
                .map(|s| {
                    let kind = s.kind();
                    SubjectSummary {
                        id: kind.id().to_string(),
                        name: kind.name().to_string(),
                        arguments: kind.schema().iter().cloned().collect(),
                    }
                })
                .collect(),
            triggers: registry
                .triggers()
                .iter()
                .map(|t| t.definition().clone())
                .collect(),
            transformers: registry
                .transformers()
                .iter()
                .map(|e| TransformerSummary {
                    source: e.source().to_string(),
                    target: e.target().to_string(),
                })
                .collect(),
            context_factories: registry.context_factory_ids(),
        }
    }

    /// Restrict to the entries namespaced by one integration.
    ///
    /// Transformers are kept when either endpoint belongs to the integration.
    pub fn for_integration(&self, integration: &str) -> Self {
        let owns = |id: &str| integration_of(id) == Some(integration);
        Self {
            subjects: self
                .subjects
                .iter()
                .filter(|s| owns(&s.id))
                .cloned()
                .collect(),
            triggers: self
                .triggers
                .iter()
                .filter(|t| owns(&t.id))
                .cloned()
                .collect(),
            transformers: self
                .transformers
                .iter()
                .filter(|e| owns(&e.source) || owns(&e.target))
                .cloned()
                .collect(),
            context_factories: self
                .context_factories
                .iter()
                .filter(|id| id.as_str() == integration)
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
            && self.triggers.is_empty()
            && self.transformers.is_empty()
            && self.context_factories.is_empty()
    }
}

impl Registry {
    /// Serializable snapshot of every registered component.
    pub fn catalog(&self) -> Catalog {
        Catalog::from_registry(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextData;
    use crate::subject::{ArgumentSchema, ArgumentType, SchemaSubject, SubjectInstance, SubjectKind};
    use crate::trigger::{EventTrigger, TriggerDefinition};

    fn sample() -> Registry {
        let registry = Registry::new();
        registry
            .register_context_factory("shop", || Ok(ContextData::new()))
            .unwrap();
        registry
            .register_subject(SchemaSubject::new(
                SubjectKind::new(
                    "site.visitor",
                    ArgumentSchema::new().required("session_id", ArgumentType::String),
                )
                .with_name("Visitor"),
            ))
            .unwrap();
        registry
            .register_subject(SchemaSubject::new(SubjectKind::new(
                "shop.customer",
                ArgumentSchema::new(),
            )))
            .unwrap();
        registry
            .register_trigger(EventTrigger::new(TriggerDefinition::new(
                "site.signed_up",
                "site.visitor",
            )))
            .unwrap();
        registry
            .register_transformer_fn("site.visitor", "shop.customer", |s| {
                Ok(SubjectInstance::new("shop.customer", s.args.clone()))
            })
            .unwrap();
        registry.mark_ready().unwrap();
        registry
    }

    #[test]
    fn test_catalog_snapshot() {
        let catalog = sample().catalog();
        assert_eq!(catalog.subjects.len(), 2);
        assert_eq!(catalog.subjects[0].name, "Visitor");
        assert_eq!(catalog.subjects[0].arguments[0].name, "session_id");
        assert_eq!(catalog.triggers[0].subject, "site.visitor");
        assert_eq!(catalog.transformers[0].target, "shop.customer");
        assert_eq!(catalog.context_factories, vec!["shop"]);
    }

    #[test]
    fn test_for_integration() {
        let catalog = sample().catalog();

        let shop = catalog.for_integration("shop");
        assert_eq!(shop.subjects.len(), 1);
        assert!(shop.triggers.is_empty());
        assert_eq!(shop.transformers.len(), 1);
        assert_eq!(shop.context_factories, vec!["shop"]);

        let site = catalog.for_integration("site");
        assert_eq!(site.triggers.len(), 1);
        assert!(site.context_factories.is_empty());

        assert!(catalog.for_integration("other").is_empty());
    }

    #[test]
    fn test_catalog_serializes() {
        let json = serde_json::to_value(sample().catalog()).unwrap();
        assert_eq!(json["subjects"][0]["arguments"][0]["type"], "string");
        assert_eq!(json["transformers"][0]["source"], "site.visitor");
    }
}
