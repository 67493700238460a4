//! The central automation registry.
//!
//! The registry is two-phase. While writable, integrations register
//! subjects, triggers, transformers and context factories; every mutation is
//! serialized through one mutex. [`Registry::mark_ready`] validates every
//! cross-reference and freezes a snapshot. From then on reads go to the
//! snapshot without locking and all registration calls fail with
//! [`AutomationError::RegistryClosed`].
//!
//! ```text
//!   register_*  ──►  [ writable: Mutex<Entries> ]
//!                          │ mark_ready (integrity check)
//!                          ▼
//!   resolve / find_transform_path / fire  ──►  [ frozen: OnceLock<Entries> ]
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::{ContextData, ContextFactoryEntry};
use crate::error::{AutomationError, DanglingReference, EntryKind, Result};
use crate::integration::integration_of;
use crate::path::TransformGraph;
use crate::subject::{Payload, Subject, SubjectInstance};
use crate::transformer::{
    FnTransformer, SubjectTransformer, TransformFailure, TransformPath, TransformerEdge,
};
use crate::trigger::Trigger;

/// When cross-references to subject kinds are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Accept registrations in any order; `mark_ready` reports every
    /// dangling reference at once.
    #[default]
    Deferred,
    /// Reject triggers and transformers whose subject kinds are not yet
    /// registered with `UnknownSubjectKind`.
    Eager,
}

/// Component counts of a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub subjects: usize,
    pub triggers: usize,
    pub transformers: usize,
    pub context_factories: usize,
}

#[derive(Default)]
struct Entries {
    subjects: Vec<Arc<dyn Subject>>,
    subject_index: HashMap<String, usize>,
    triggers: Vec<Arc<dyn Trigger>>,
    trigger_index: HashMap<String, usize>,
    edges: Vec<TransformerEdge>,
    edge_index: HashMap<(String, String), usize>,
    graph: TransformGraph,
    factories: Vec<ContextFactoryEntry>,
    factory_index: HashMap<String, usize>,
}

impl Entries {
    fn has_subject(&self, id: &str) -> bool {
        self.subject_index.contains_key(id)
    }

    fn stats(&self) -> RegistryStats {
        RegistryStats {
            subjects: self.subjects.len(),
            triggers: self.triggers.len(),
            transformers: self.edges.len(),
            context_factories: self.factories.len(),
        }
    }

    /// Every reference to a subject kind that is not registered, in
    /// registration order.
    fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for trigger in &self.triggers {
            let def = trigger.definition();
            if !self.has_subject(&def.subject) {
                dangling.push(DanglingReference::Trigger {
                    trigger: def.id.clone(),
                    subject: def.subject.clone(),
                });
            }
        }

        for edge in &self.edges {
            if !self.has_subject(edge.source()) {
                dangling.push(DanglingReference::TransformerSource {
                    source: edge.source().to_string(),
                    target: edge.target().to_string(),
                });
            }
            if !self.has_subject(edge.target()) {
                dangling.push(DanglingReference::TransformerTarget {
                    source: edge.source().to_string(),
                    target: edge.target().to_string(),
                });
            }
        }

        dangling
    }
}

struct Writable {
    entries: Entries,
    closed: bool,
}

/// Catalog of triggers, subjects, transformers and context factories.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct Registry {
    mode: ValidationMode,
    writable: Mutex<Writable>,
    frozen: OnceLock<Entries>,
}

impl Registry {
    /// Create an empty, writable registry with deferred validation.
    pub fn new() -> Self {
        Self::with_validation(ValidationMode::default())
    }

    /// Create an empty, writable registry with the given validation mode.
    pub fn with_validation(mode: ValidationMode) -> Self {
        Self {
            mode,
            writable: Mutex::new(Writable {
                entries: Entries::default(),
                closed: false,
            }),
            frozen: OnceLock::new(),
        }
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.mode
    }

    /// Whether `mark_ready` has succeeded.
    pub fn is_ready(&self) -> bool {
        self.frozen.get().is_some()
    }

    /// Run a mutation under the lock. The closure must check every
    /// precondition before changing anything.
    fn mutate<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Entries, ValidationMode) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.writable.lock();
        if guard.closed {
            return Err(AutomationError::RegistryClosed { operation });
        }
        f(&mut guard.entries, self.mode)
    }

    /// Run a read against the frozen snapshot, or under the lock while writable.
    fn read<R>(&self, f: impl FnOnce(&Entries) -> R) -> R {
        if let Some(entries) = self.frozen.get() {
            return f(entries);
        }
        let guard = self.writable.lock();
        // Readers that lost the race with `mark_ready` find the entries moved out.
        match self.frozen.get() {
            Some(entries) => f(entries),
            None => f(&guard.entries),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Register a subject. Fails with `DuplicateIdentifier` if its kind
    /// identifier is taken.
    pub fn register_subject<S: Subject + 'static>(&self, subject: S) -> Result<()> {
        let subject: Arc<dyn Subject> = Arc::new(subject);
        let id = subject.kind().id().to_string();

        self.mutate("register subject", |entries, _| {
            if entries.has_subject(&id) {
                return Err(AutomationError::DuplicateIdentifier {
                    kind: EntryKind::Subject,
                    id: id.clone(),
                });
            }
            entries.subject_index.insert(id.clone(), entries.subjects.len());
            entries.subjects.push(subject);
            Ok(())
        })?;

        debug!(subject = %id, "Registered subject");
        Ok(())
    }

    /// Register a trigger. Fails with `DuplicateIdentifier` on collision and,
    /// in eager mode, with `UnknownSubjectKind` if its subject is unknown.
    pub fn register_trigger<T: Trigger + 'static>(&self, trigger: T) -> Result<()> {
        let trigger: Arc<dyn Trigger> = Arc::new(trigger);
        let def = trigger.definition().clone();

        self.mutate("register trigger", |entries, mode| {
            if entries.trigger_index.contains_key(&def.id) {
                return Err(AutomationError::DuplicateIdentifier {
                    kind: EntryKind::Trigger,
                    id: def.id.clone(),
                });
            }
            if mode == ValidationMode::Eager && !entries.has_subject(&def.subject) {
                return Err(AutomationError::UnknownSubjectKind {
                    referenced_by: format!("trigger '{}'", def.id),
                    subject: def.subject.clone(),
                });
            }
            entries
                .trigger_index
                .insert(def.id.clone(), entries.triggers.len());
            entries.triggers.push(trigger);
            Ok(())
        })?;

        debug!(trigger = %def.id, subject = %def.subject, "Registered trigger");
        Ok(())
    }

    /// Register a transformer for its `(source, target)` pair. Fails with
    /// `DuplicateEdge` if the pair is taken and, in eager mode, with
    /// `UnknownSubjectKind` if either endpoint is unknown.
    pub fn register_transformer<T: SubjectTransformer + 'static>(&self, transformer: T) -> Result<()> {
        let transformer: Arc<dyn SubjectTransformer> = Arc::new(transformer);
        let source = transformer.source().to_string();
        let target = transformer.target().to_string();

        self.mutate("register transformer", |entries, mode| {
            let key = (source.clone(), target.clone());
            if entries.edge_index.contains_key(&key) {
                return Err(AutomationError::DuplicateEdge {
                    from: source.clone(),
                    to: target.clone(),
                });
            }
            if mode == ValidationMode::Eager {
                for endpoint in [&source, &target] {
                    if !entries.has_subject(endpoint) {
                        return Err(AutomationError::UnknownSubjectKind {
                            referenced_by: format!("transformer '{} -> {}'", source, target),
                            subject: endpoint.clone(),
                        });
                    }
                }
            }
            let idx = entries.edges.len();
            entries.edges.push(TransformerEdge::new(idx, transformer));
            entries.edge_index.insert(key, idx);
            entries.graph.add_edge(&source, &target, idx);
            Ok(())
        })?;

        debug!(source = %source, target = %target, "Registered transformer");
        Ok(())
    }

    /// Register a closure as the transformer for `source -> target`.
    pub fn register_transformer_fn<F>(
        &self,
        source: impl Into<String>,
        target: impl Into<String>,
        transform: F,
    ) -> Result<()>
    where
        F: Fn(&SubjectInstance) -> std::result::Result<SubjectInstance, TransformFailure>
            + Send
            + Sync
            + 'static,
    {
        self.register_transformer(FnTransformer::new(source, target, transform))
    }

    /// Register the context factory of an integration. Fails with
    /// `DuplicateIdentifier` if the integration already has one.
    pub fn register_context_factory<F>(&self, integration: impl Into<String>, provider: F) -> Result<()>
    where
        F: Fn() -> Result<ContextData> + Send + Sync + 'static,
    {
        let integration = integration.into();

        self.mutate("register context factory", |entries, _| {
            if entries.factory_index.contains_key(&integration) {
                return Err(AutomationError::DuplicateIdentifier {
                    kind: EntryKind::ContextFactory,
                    id: integration.clone(),
                });
            }
            entries
                .factory_index
                .insert(integration.clone(), entries.factories.len());
            entries.factories.push(ContextFactoryEntry::new(
                integration.clone(),
                Arc::new(provider),
            ));
            Ok(())
        })?;

        debug!(integration = %integration, "Registered context factory");
        Ok(())
    }

    /// Validate all cross-references and freeze the registry.
    ///
    /// Fails with `Integrity` listing every dangling reference; the registry
    /// then stays writable and unchanged. Calling it again once ready is a no-op.
    pub fn mark_ready(&self) -> Result<()> {
        let mut guard = self.writable.lock();
        if guard.closed {
            debug!("Registry already ready");
            return Ok(());
        }

        let dangling = guard.entries.dangling_references();
        if !dangling.is_empty() {
            for reference in &dangling {
                warn!(
                    reference = %reference,
                    subject = %reference.missing_subject(),
                    "Dangling registry reference"
                );
            }
            return Err(AutomationError::Integrity { dangling });
        }

        let stats = guard.entries.stats();
        // Cannot already be set: `closed` is only flipped below.
        let _ = self.frozen.set(std::mem::take(&mut guard.entries));
        guard.closed = true;

        info!(
            subjects = stats.subjects,
            triggers = stats.triggers,
            transformers = stats.transformers,
            context_factories = stats.context_factories,
            mode = ?self.mode,
            "Registry ready"
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// Resolve a subject by kind identifier.
    pub fn resolve(&self, subject_id: &str) -> Result<Arc<dyn Subject>> {
        self.read(|entries| {
            entries
                .subject_index
                .get(subject_id)
                .map(|&idx| entries.subjects[idx].clone())
                .ok_or_else(|| AutomationError::not_found(EntryKind::Subject, subject_id))
        })
    }

    /// Resolve a trigger by identifier.
    pub fn resolve_trigger(&self, trigger_id: &str) -> Result<Arc<dyn Trigger>> {
        self.read(|entries| {
            entries
                .trigger_index
                .get(trigger_id)
                .map(|&idx| entries.triggers[idx].clone())
                .ok_or_else(|| AutomationError::not_found(EntryKind::Trigger, trigger_id))
        })
    }

    /// Resolve the direct transformer registered for `source -> target`.
    pub fn resolve_transformer(&self, source: &str, target: &str) -> Result<TransformerEdge> {
        self.read(|entries| {
            entries
                .edge_index
                .get(&(source.to_string(), target.to_string()))
                .map(|&idx| entries.edges[idx].clone())
                .ok_or_else(|| {
                    AutomationError::not_found(
                        EntryKind::Transformer,
                        format!("{} -> {}", source, target),
                    )
                })
        })
    }

    /// Resolve the context factory of an integration.
    pub fn context_factory(&self, integration: &str) -> Result<ContextFactoryEntry> {
        self.read(|entries| {
            entries
                .factory_index
                .get(integration)
                .map(|&idx| entries.factories[idx].clone())
                .ok_or_else(|| AutomationError::not_found(EntryKind::ContextFactory, integration))
        })
    }

    /// All subjects, in registration order.
    pub fn subjects(&self) -> Vec<Arc<dyn Subject>> {
        self.read(|entries| entries.subjects.clone())
    }

    /// All triggers, in registration order.
    pub fn triggers(&self) -> Vec<Arc<dyn Trigger>> {
        self.read(|entries| entries.triggers.clone())
    }

    /// All transformer edges, in registration order.
    pub fn transformers(&self) -> Vec<TransformerEdge> {
        self.read(|entries| entries.edges.clone())
    }

    /// Integration identifiers with a context factory, in registration order.
    pub fn context_factory_ids(&self) -> Vec<String> {
        self.read(|entries| {
            entries
                .factories
                .iter()
                .map(|f| f.integration().to_string())
                .collect()
        })
    }

    /// Subjects whose identifier is namespaced by `integration`.
    pub fn subjects_for_integration(&self, integration: &str) -> Vec<Arc<dyn Subject>> {
        self.subjects()
            .into_iter()
            .filter(|s| integration_of(s.kind().id()) == Some(integration))
            .collect()
    }

    /// Triggers whose identifier is namespaced by `integration`.
    pub fn triggers_for_integration(&self, integration: &str) -> Vec<Arc<dyn Trigger>> {
        self.triggers()
            .into_iter()
            .filter(|t| integration_of(&t.definition().id) == Some(integration))
            .collect()
    }

    /// Transformers touching a subject kind of `integration` at either end.
    pub fn transformers_for_integration(&self, integration: &str) -> Vec<TransformerEdge> {
        self.transformers()
            .into_iter()
            .filter(|e| {
                integration_of(e.source()) == Some(integration)
                    || integration_of(e.target()) == Some(integration)
            })
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        self.read(Entries::stats)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────

    /// Find the shortest transformer chain from `source` to `target`.
    ///
    /// Breadth-first over the transformer graph: the chain with the fewest
    /// conversions wins, a direct edge always beats a longer chain, and ties
    /// go to the earliest-registered edges. Fails with `NotFound` for an
    /// unknown subject kind and `NoPathFound` when nothing connects the two.
    pub fn find_transform_path(&self, source: &str, target: &str) -> Result<TransformPath> {
        self.read(|entries| {
            for kind in [source, target] {
                if !entries.has_subject(kind) {
                    return Err(AutomationError::not_found(EntryKind::Subject, kind));
                }
            }

            let indices = entries.graph.shortest_path(source, target).ok_or_else(|| {
                AutomationError::NoPathFound {
                    from: source.to_string(),
                    to: target.to_string(),
                }
            })?;

            Ok(TransformPath::new(
                indices
                    .into_iter()
                    .map(|idx| entries.edges[idx].clone())
                    .collect(),
            ))
        })
    }

    /// Convert a subject instance to `target` along the shortest chain.
    pub fn transform(&self, subject: &SubjectInstance, target: &str) -> Result<SubjectInstance> {
        let path = self.find_transform_path(&subject.kind, target)?;
        debug!(
            source = %subject.kind,
            target = %target,
            hops = path.len(),
            "Transforming subject"
        );
        path.apply(subject)
    }

    /// Turn a raw event into the subject instance a trigger emits.
    ///
    /// Returns `Ok(None)` when the event does not satisfy the trigger's
    /// watched condition for the given step arguments.
    pub fn fire(
        &self,
        trigger_id: &str,
        payload: &Payload,
        step_args: &Payload,
    ) -> Result<Option<SubjectInstance>> {
        let trigger = self.resolve_trigger(trigger_id)?;
        let subject = self.resolve(&trigger.definition().subject)?;
        let instance = subject.extract(payload)?;

        if !trigger.is_triggered_by(step_args, &instance) {
            debug!(trigger = %trigger_id, "Event does not satisfy trigger condition");
            return Ok(None);
        }
        Ok(Some(instance))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("mode", &self.mode)
            .field("ready", &self.is_ready())
            .field("stats", &self.stats())
            .finish()
    }
}
