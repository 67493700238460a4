//! CLI command handlers.

pub mod catalog;
pub mod check;
pub mod context;
pub mod convert;
pub mod fire;
pub mod path;

use anyhow::{Context as _, Result, bail};
use conduit_automation::{BootReport, Payload, Registry};
use conduit_config::ConduitConfig;
use serde_json::Value;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration.
    pub config: ConduitConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Boot a ready registry from the configured integrations.
    pub fn registry(&self) -> Result<(Registry, BootReport)> {
        conduit_integrations::build_registry(&self.config)
            .context("failed to boot automation registry")
    }
}

/// Parse a JSON object given on the command line.
pub fn parse_object(flag: &str, text: &str) -> Result<Payload> {
    let value: Value =
        serde_json::from_str(text).with_context(|| format!("--{} is not valid JSON", flag))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("--{} must be a JSON object, got {}", flag, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let map = parse_object("payload", r#"{"a": 1}"#).unwrap();
        assert_eq!(map["a"], 1);
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        let err = parse_object("payload", "[1, 2]").unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
        let err = parse_object("args", "{oops").unwrap_err();
        assert!(err.to_string().contains("--args is not valid JSON"));
    }
}
