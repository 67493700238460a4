//! Automation registry for Conduit.
//!
//! Independently authored integrations populate one shared [`Registry`] with
//! triggers, subjects, subject transformers and context factories. The
//! workflow executor then asks the registry what is available and how to
//! convert a subject of one kind into another.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   register   ┌────────────────────────────────────────┐
//! │  Integration  │ ───────────► │  Registry                              │
//! │  (optional,   │              │  - subjects / triggers                 │
//! │   probed)     │              │  - transformer graph (BFS paths)       │
//! └───────────────┘              │  - context factories                   │
//!                                │  writable ──mark_ready──► frozen       │
//!                                └───────────────┬────────────────────────┘
//!                                                │ resolve / transform / fire
//!                                                ▼
//!                                ┌────────────────────────────────────────┐
//!                                │  EvaluationScope (per workflow run)    │
//!                                │  - memoized context factory results    │
//!                                └────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod integration;
mod path;
pub mod registry;
pub mod subject;
pub mod transformer;
pub mod trigger;

pub use catalog::{Catalog, SubjectSummary, TransformerSummary};
pub use context::{ContextData, ContextFactoryEntry, ContextProvider, EvaluationScope};
pub use error::{AutomationError, DanglingReference, EntryKind, Result};
pub use integration::{
    BootReport, Integration, RegistrationOutcome, bootstrap, integration_of, qualified_id,
};
pub use registry::{Registry, RegistryStats, ValidationMode};
pub use subject::{
    ArgumentSchema, ArgumentSpec, ArgumentType, Payload, SchemaSubject, Subject, SubjectInstance,
    SubjectKind,
};
pub use transformer::{
    FnTransformer, SubjectTransformer, TransformFailure, TransformFn, TransformPath,
    TransformerEdge,
};
pub use trigger::{EventTrigger, Trigger, TriggerDefinition};
