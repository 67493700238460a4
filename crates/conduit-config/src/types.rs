//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [registry]                         # validation mode
//! [logging]                          # level, json output, log file directory
//! [integrations.platform]            # host CMS integration
//! [integrations.commerce]            # commerce platform integration
//! [[integrations.commerce.customers]]
//! [[integrations.commerce.orders]]
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use conduit_automation::ValidationMode;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConduitConfig {
    /// Registry behavior.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistrySection>,

    /// Log output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,

    /// Per-integration settings.
    #[serde(skip_serializing_if = "IntegrationsSection::is_empty")]
    pub integrations: IntegrationsSection,
}

impl ConduitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, never field by field.
    pub fn merge(&mut self, other: ConduitConfig) {
        if other.registry.is_some() {
            self.registry = other.registry;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }

        if other.integrations.platform.is_some() {
            self.integrations.platform = other.integrations.platform;
        }

        if other.integrations.commerce.is_some() {
            self.integrations.commerce = other.integrations.commerce;
        }
    }

    /// Effective registry section.
    pub fn registry(&self) -> RegistrySection {
        self.registry.clone().unwrap_or_default()
    }

    /// Effective logging section.
    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }

    /// Effective platform integration section.
    pub fn platform(&self) -> PlatformSection {
        self.integrations.platform.clone().unwrap_or_default()
    }

    /// Effective commerce integration section.
    pub fn commerce(&self) -> CommerceSection {
        self.integrations.commerce.clone().unwrap_or_default()
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let logging = self.logging();
        if logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "must not be empty"));
        }

        if let Some(commerce) = &self.integrations.commerce {
            commerce.validate()?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry / Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Registry configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// When references to subject kinds are checked.
    pub validation: ValidationMode,
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default filter directive (`info`, `debug`, `conduit_automation=trace`).
    pub level: String,
    /// Emit JSON lines on stderr instead of human-readable output.
    pub json: bool,
    /// Directory for daily-rolling JSON log files. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_dir: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Integrations
// ─────────────────────────────────────────────────────────────────────────────

/// The `[integrations]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commerce: Option<CommerceSection>,
}

impl IntegrationsSection {
    pub fn is_empty(&self) -> bool {
        self.platform.is_none() && self.commerce.is_none()
    }
}

fn default_enabled() -> bool {
    true
}

/// Host platform integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Commerce platform integration settings.
///
/// Backs the in-memory commerce platform: `enabled` is its liveness probe,
/// the lists feed the context factory and `customers`/`orders` are the
/// records transformers look up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommerceSection {
    pub enabled: bool,
    /// ISO 4217 store currency.
    pub currency: String,
    pub order_statuses: Vec<String>,
    pub payment_methods: Vec<String>,
    pub shipping_methods: Vec<String>,
    pub customers: Vec<CustomerEntry>,
    pub orders: Vec<OrderEntry>,
}

impl Default for CommerceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            currency: "USD".to_string(),
            order_statuses: [
                "pending",
                "processing",
                "on-hold",
                "completed",
                "cancelled",
                "refunded",
                "failed",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            payment_methods: Vec::new(),
            shipping_methods: Vec::new(),
            customers: Vec::new(),
            orders: Vec::new(),
        }
    }
}

impl CommerceSection {
    fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::invalid(
                "integrations.commerce.currency",
                "must not be empty",
            ));
        }

        if self.order_statuses.is_empty() {
            return Err(ConfigError::invalid(
                "integrations.commerce.order_statuses",
                "at least one order status is required",
            ));
        }

        let mut customer_ids = HashSet::new();
        let mut account_ids = HashSet::new();
        for customer in &self.customers {
            if !customer_ids.insert(customer.customer_id) {
                return Err(ConfigError::invalid(
                    "integrations.commerce.customers",
                    format!("duplicate customer_id {}", customer.customer_id),
                ));
            }
            if let Some(account_id) = customer.account_id
                && !account_ids.insert(account_id)
            {
                return Err(ConfigError::invalid(
                    "integrations.commerce.customers",
                    format!("account_id {} is linked to more than one customer", account_id),
                ));
            }
        }

        let mut order_ids = HashSet::new();
        for order in &self.orders {
            if !order_ids.insert(order.order_id) {
                return Err(ConfigError::invalid(
                    "integrations.commerce.orders",
                    format!("duplicate order_id {}", order.order_id),
                ));
            }
            if let Some(customer_id) = order.customer_id
                && !customer_ids.contains(&customer_id)
            {
                return Err(ConfigError::invalid(
                    "integrations.commerce.orders",
                    format!(
                        "order {} references unknown customer_id {}",
                        order.order_id, customer_id
                    ),
                ));
            }
            if !self.order_statuses.contains(&order.status) {
                return Err(ConfigError::invalid(
                    "integrations.commerce.orders",
                    format!("order {} has unknown status '{}'", order.order_id, order.status),
                ));
            }
        }

        Ok(())
    }
}

/// A commerce customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEntry {
    pub customer_id: i64,
    /// Host platform account linked to this customer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    pub email: String,
}

/// A commerce order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub order_id: i64,
    /// Absent for guest checkouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub total: f64,
    pub status: String,
}
