//! Subject transformers: conversions between subject kinds.
//!
//! Transformers are the edges of a directed graph over subject kinds. A
//! workflow step that needs kind B while holding an instance of kind A asks
//! the registry for a [`TransformPath`] and applies it hop by hop.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{AutomationError, Result};
use crate::subject::SubjectInstance;

/// Why a transformer could not produce its output.
///
/// This is an expected outcome (an anonymous visitor has no customer record),
/// not a defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct TransformFailure {
    pub reason: String,
}

impl TransformFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The source instance lacks an argument the target needs.
    pub fn missing_argument(name: &str) -> Self {
        Self::new(format!("source subject has no '{}'", name))
    }
}

/// Converts an instance of one subject kind into another.
pub trait SubjectTransformer: Send + Sync {
    /// Source subject kind identifier.
    fn source(&self) -> &str;

    /// Target subject kind identifier.
    fn target(&self) -> &str;

    /// Deterministically produce a target instance, or fail.
    fn transform(
        &self,
        subject: &SubjectInstance,
    ) -> std::result::Result<SubjectInstance, TransformFailure>;
}

/// Transform function signature for closure-backed transformers.
pub type TransformFn = Arc<
    dyn Fn(&SubjectInstance) -> std::result::Result<SubjectInstance, TransformFailure>
        + Send
        + Sync,
>;

/// A transformer backed by a closure.
#[derive(Clone)]
pub struct FnTransformer {
    source: String,
    target: String,
    transform: TransformFn,
}

impl FnTransformer {
    pub fn new<F>(source: impl Into<String>, target: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&SubjectInstance) -> std::result::Result<SubjectInstance, TransformFailure>
            + Send
            + Sync
            + 'static,
    {
        Self {
            source: source.into(),
            target: target.into(),
            transform: Arc::new(transform),
        }
    }
}

impl SubjectTransformer for FnTransformer {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn transform(
        &self,
        subject: &SubjectInstance,
    ) -> std::result::Result<SubjectInstance, TransformFailure> {
        (self.transform)(subject)
    }
}

impl std::fmt::Debug for FnTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransformer")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

/// A registered transformer: one directed edge of the transform graph.
#[derive(Clone)]
pub struct TransformerEdge {
    source: String,
    target: String,
    /// Position in registration order, used for deterministic tie-breaking.
    order: usize,
    transformer: Arc<dyn SubjectTransformer>,
}

impl TransformerEdge {
    pub(crate) fn new(order: usize, transformer: Arc<dyn SubjectTransformer>) -> Self {
        Self {
            source: transformer.source().to_string(),
            target: transformer.target().to_string(),
            order,
            transformer,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Registration order of this edge (0-based).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Apply this single hop.
    ///
    /// Fails with [`AutomationError::Transform`] if the input is not of the
    /// source kind, the transformer fails, or its output is not of the target kind.
    pub fn apply(&self, subject: &SubjectInstance) -> Result<SubjectInstance> {
        if subject.kind != self.source {
            return Err(self.failure(format!(
                "expected subject of kind '{}', got '{}'",
                self.source, subject.kind
            )));
        }

        let output = self
            .transformer
            .transform(subject)
            .map_err(|e| self.failure(e.reason))?;

        if output.kind != self.target {
            return Err(self.failure(format!(
                "transformer produced kind '{}' instead of '{}'",
                output.kind, self.target
            )));
        }

        trace!(source = %self.source, target = %self.target, "Applied transformer");
        Ok(output)
    }

    fn failure(&self, reason: String) -> AutomationError {
        AutomationError::Transform {
            from: self.source.clone(),
            to: self.target.clone(),
            reason,
        }
    }
}

impl std::fmt::Debug for TransformerEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerEdge")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("order", &self.order)
            .finish()
    }
}

/// An ordered chain of transformer edges from one subject kind to another.
///
/// An empty path is the identity conversion.
#[derive(Debug, Clone, Default)]
pub struct TransformPath {
    edges: Vec<TransformerEdge>,
}

impl TransformPath {
    pub(crate) fn new(edges: Vec<TransformerEdge>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[TransformerEdge] {
        &self.edges
    }

    /// Number of conversions in the chain.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether the chain is a single direct edge.
    pub fn is_direct(&self) -> bool {
        self.edges.len() == 1
    }

    /// Subject kinds visited by the chain, source first.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds = Vec::with_capacity(self.edges.len() + 1);
        if let Some(first) = self.edges.first() {
            kinds.push(first.source());
        }
        kinds.extend(self.edges.iter().map(|e| e.target()));
        kinds
    }

    /// Apply every hop in order. The first failing hop fails the whole chain
    /// with a [`AutomationError::Transform`] naming that edge.
    pub fn apply(&self, subject: &SubjectInstance) -> Result<SubjectInstance> {
        let mut current = subject.clone();
        for edge in &self.edges {
            current = edge.apply(&current).inspect_err(|e| {
                debug!(
                    source = %edge.source(),
                    target = %edge.target(),
                    error = %e,
                    "Transform chain stopped"
                );
            })?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Payload;
    use serde_json::json;

    fn instance(kind: &str, args: serde_json::Value) -> SubjectInstance {
        let args = match args {
            serde_json::Value::Object(map) => map,
            _ => Payload::new(),
        };
        SubjectInstance::new(kind, args)
    }

    fn rename(source: &'static str, target: &'static str) -> TransformerEdge {
        TransformerEdge::new(
            0,
            Arc::new(FnTransformer::new(source, target, move |s| {
                Ok(SubjectInstance::new(target, s.args.clone()))
            })),
        )
    }

    #[test]
    fn test_edge_apply() {
        let edge = rename("a", "b");
        let out = edge.apply(&instance("a", json!({"x": 1}))).unwrap();
        assert_eq!(out.kind, "b");
        assert_eq!(out.get_i64("x"), Some(1));
    }

    #[test]
    fn test_edge_rejects_wrong_input_kind() {
        let edge = rename("a", "b");
        let err = edge.apply(&instance("c", json!({}))).unwrap_err();
        assert!(matches!(err, AutomationError::Transform { .. }));
        assert!(err.to_string().contains("expected subject of kind 'a'"));
    }

    #[test]
    fn test_edge_rejects_wrong_output_kind() {
        let edge = TransformerEdge::new(
            0,
            Arc::new(FnTransformer::new("a", "b", |s| {
                Ok(SubjectInstance::new("z", s.args.clone()))
            })),
        );
        let err = edge.apply(&instance("a", json!({}))).unwrap_err();
        assert!(err.to_string().contains("produced kind 'z'"));
    }

    #[test]
    fn test_chain_failure_names_failing_edge() {
        let failing = TransformerEdge::new(
            1,
            Arc::new(FnTransformer::new("b", "c", |_| {
                Err(TransformFailure::missing_argument("account_id"))
            })),
        );
        let path = TransformPath::new(vec![rename("a", "b"), failing]);
        let err = path.apply(&instance("a", json!({}))).unwrap_err();
        match err {
            AutomationError::Transform { from, to, reason } => {
                assert_eq!(from, "b");
                assert_eq!(to, "c");
                assert!(reason.contains("account_id"));
            }
            other => panic!("Expected Transform, got: {other}"),
        }
    }

    #[test]
    fn test_empty_path_is_identity() {
        let path = TransformPath::default();
        let input = instance("a", json!({"x": 1}));
        assert_eq!(path.apply(&input).unwrap(), input);
        assert!(path.kinds().is_empty());
    }

    #[test]
    fn test_path_kinds() {
        let path = TransformPath::new(vec![rename("a", "b"), rename("b", "c")]);
        assert_eq!(path.kinds(), vec!["a", "b", "c"]);
        assert!(!path.is_direct());
    }
}
