//! Error types for the automation registry.

use std::fmt;

use thiserror::Error;

/// Result type alias using the automation error type.
pub type Result<T> = std::result::Result<T, AutomationError>;

/// Which mapping of the registry an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Subject,
    Trigger,
    Transformer,
    ContextFactory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Subject => write!(f, "subject"),
            EntryKind::Trigger => write!(f, "trigger"),
            EntryKind::Transformer => write!(f, "transformer"),
            EntryKind::ContextFactory => write!(f, "context factory"),
        }
    }
}

/// A cross-reference to a subject kind that was never registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    /// A trigger emits an unknown subject kind.
    Trigger { trigger: String, subject: String },
    /// A transformer converts from an unknown subject kind.
    TransformerSource { source: String, target: String },
    /// A transformer converts into an unknown subject kind.
    TransformerTarget { source: String, target: String },
}

impl DanglingReference {
    /// The identifier of the subject kind that is missing.
    pub fn missing_subject(&self) -> &str {
        match self {
            DanglingReference::Trigger { subject, .. } => subject,
            DanglingReference::TransformerSource { source, .. } => source,
            DanglingReference::TransformerTarget { target, .. } => target,
        }
    }
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DanglingReference::Trigger { trigger, subject } => {
                write!(f, "trigger '{}' emits unknown subject '{}'", trigger, subject)
            }
            DanglingReference::TransformerSource { source, target } => write!(
                f,
                "transformer '{} -> {}' has unknown source subject '{}'",
                source, target, source
            ),
            DanglingReference::TransformerTarget { source, target } => write!(
                f,
                "transformer '{} -> {}' has unknown target subject '{}'",
                source, target, target
            ),
        }
    }
}

/// Errors raised by the registry and the components it hosts.
///
/// Registration-time variants are configuration defects and should abort
/// startup; see [`AutomationError::is_configuration_error`].
#[derive(Debug, Error)]
pub enum AutomationError {
    /// An identifier is already registered in the same mapping.
    #[error("duplicate {kind} identifier '{id}'")]
    DuplicateIdentifier { kind: EntryKind, id: String },

    /// A transformer is already registered for this ordered pair.
    #[error("duplicate transformer edge '{from}' -> '{to}'")]
    DuplicateEdge { from: String, to: String },

    /// A registration references a subject kind that does not exist.
    #[error("{referenced_by} references unknown subject kind '{subject}'")]
    UnknownSubjectKind {
        referenced_by: String,
        subject: String,
    },

    /// `mark_ready` found dangling references.
    #[error("registry integrity check failed: {}", format_dangling(.dangling))]
    Integrity { dangling: Vec<DanglingReference> },

    /// A mutation was attempted after the registry was marked ready.
    #[error("registry is closed: cannot {operation} after mark_ready")]
    RegistryClosed { operation: &'static str },

    /// Lookup of an identifier that was never registered.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntryKind, id: String },

    /// No transformer chain connects two subject kinds.
    #[error("no transform path from '{from}' to '{to}'")]
    NoPathFound { from: String, to: String },

    /// A transformer could not produce output from its input.
    #[error("transform '{from}' -> '{to}' failed: {reason}")]
    Transform {
        from: String,
        to: String,
        reason: String,
    },

    /// A raw trigger payload does not satisfy a subject's argument schema.
    #[error("invalid payload for subject '{subject}': {reason}")]
    InvalidPayload { subject: String, reason: String },

    /// A context factory provider failed.
    #[error("context factory '{integration}' failed: {reason}")]
    ContextFactory { integration: String, reason: String },
}

impl AutomationError {
    /// Create a not-found error.
    pub fn not_found(kind: EntryKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an invalid-payload error.
    pub fn invalid_payload(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create a context factory error.
    pub fn context_factory(integration: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContextFactory {
            integration: integration.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a registration-time configuration defect.
    ///
    /// Configuration errors leave the registry half-assembled and should abort
    /// process startup. Everything else is recoverable by the caller.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateIdentifier { .. }
                | Self::DuplicateEdge { .. }
                | Self::UnknownSubjectKind { .. }
                | Self::Integrity { .. }
                | Self::RegistryClosed { .. }
        )
    }
}

fn format_dangling(dangling: &[DanglingReference]) -> String {
    dangling
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_message_lists_every_reference() {
        let err = AutomationError::Integrity {
            dangling: vec![
                DanglingReference::Trigger {
                    trigger: "shop.order_paid".into(),
                    subject: "shop.order".into(),
                },
                DanglingReference::TransformerTarget {
                    source: "shop.cart".into(),
                    target: "shop.customer".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("trigger 'shop.order_paid' emits unknown subject 'shop.order'"));
        assert!(msg.contains("unknown target subject 'shop.customer'"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(
            AutomationError::DuplicateEdge {
                from: "a".into(),
                to: "b".into(),
            }
            .is_configuration_error()
        );
        assert!(
            AutomationError::RegistryClosed {
                operation: "register subject",
            }
            .is_configuration_error()
        );
        assert!(!AutomationError::not_found(EntryKind::Subject, "x").is_configuration_error());
        assert!(
            !AutomationError::NoPathFound {
                from: "a".into(),
                to: "b".into(),
            }
            .is_configuration_error()
        );
    }

    #[test]
    fn test_missing_subject() {
        let d = DanglingReference::TransformerSource {
            source: "a".into(),
            target: "b".into(),
        };
        assert_eq!(d.missing_subject(), "a");
    }

    #[test]
    fn test_entry_kind_display() {
        assert_eq!(
            AutomationError::not_found(EntryKind::ContextFactory, "shop").to_string(),
            "context factory 'shop' not found"
        );
    }
}
