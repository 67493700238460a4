//! Context factories and per-evaluation scopes.
//!
//! A context factory is a zero-argument provider of auxiliary, read-only
//! data for one integration (order statuses, currency, feature flags). The
//! registry stores providers; an [`EvaluationScope`] invokes each provider at
//! most once for the duration of one workflow evaluation and hands out the
//! shared result. A new scope calls the providers again, since the data may
//! be time-sensitive.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::registry::Registry;

/// Opaque auxiliary data produced by a context factory.
pub type ContextData = serde_json::Map<String, Value>;

/// Provider function signature.
pub type ContextProvider = Arc<dyn Fn() -> Result<ContextData> + Send + Sync>;

/// A registered context factory.
#[derive(Clone)]
pub struct ContextFactoryEntry {
    integration: String,
    provider: ContextProvider,
}

impl ContextFactoryEntry {
    pub(crate) fn new(integration: String, provider: ContextProvider) -> Self {
        Self {
            integration,
            provider,
        }
    }

    /// Integration identifier this factory belongs to.
    pub fn integration(&self) -> &str {
        &self.integration
    }

    /// Invoke the provider. Every call runs it again; use an
    /// [`EvaluationScope`] for memoization.
    pub fn invoke(&self) -> Result<ContextData> {
        (self.provider)()
    }
}

impl std::fmt::Debug for ContextFactoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextFactoryEntry")
            .field("integration", &self.integration)
            .finish()
    }
}

/// One workflow evaluation's view of the context factories.
pub struct EvaluationScope<'r> {
    id: Uuid,
    started_at: DateTime<Utc>,
    registry: &'r Registry,
    cache: Mutex<HashMap<String, Arc<ContextData>>>,
}

impl<'r> EvaluationScope<'r> {
    /// Open a scope against a registry.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Unique identifier of this evaluation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the context data of one integration, invoking its factory on
    /// first use within this scope.
    ///
    /// Fails with `NotFound` for an unknown integration. A failing provider
    /// is not cached, so a later call retries it.
    pub fn context(&self, integration: &str) -> Result<Arc<ContextData>> {
        // Held across the provider call so concurrent readers in the same
        // scope never invoke a provider twice.
        let mut cache = self.cache.lock();
        if let Some(data) = cache.get(integration) {
            return Ok(data.clone());
        }

        let entry = self.registry.context_factory(integration)?;
        let data = Arc::new(entry.invoke()?);
        debug!(
            scope = %self.id,
            integration = %integration,
            keys = data.len(),
            "Context factory invoked"
        );
        cache.insert(integration.to_string(), data.clone());
        Ok(data)
    }

    /// Materialize the context of every registered factory, keyed by integration.
    pub fn context_all(&self) -> Result<BTreeMap<String, Arc<ContextData>>> {
        let mut all = BTreeMap::new();
        for integration in self.registry.context_factory_ids() {
            let data = self.context(&integration)?;
            all.insert(integration, data);
        }
        Ok(all)
    }

    /// Number of factories already invoked in this scope.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }
}
