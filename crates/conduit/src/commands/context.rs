//! Context command - evaluates context factories in one scope.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use conduit_automation::{ContextData, EvaluationScope};

use super::Context;

/// Arguments for the context command.
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Integration whose context to evaluate (all if omitted)
    pub integration: Option<String>,
}

/// Run the context command.
pub fn run(args: ContextArgs, ctx: &Context) -> Result<()> {
    let (registry, _) = ctx.registry()?;
    let scope = EvaluationScope::new(&registry);

    let contexts: BTreeMap<String, Arc<ContextData>> = match &args.integration {
        Some(integration) => {
            let data = scope.context(integration)?;
            BTreeMap::from([(integration.clone(), data)])
        }
        None => scope.context_all()?,
    };

    if ctx.json_output {
        let plain: BTreeMap<&str, &ContextData> = contexts
            .iter()
            .map(|(integration, data)| (integration.as_str(), data.as_ref()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&plain)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    if ctx.verbose {
        println!(
            "{}",
            dim.apply_to(format!("scope {} at {}", scope.id(), scope.started_at()))
        );
    }
    if contexts.is_empty() {
        println!("{}", dim.apply_to("(no context factories registered)"));
    }
    for (integration, data) in &contexts {
        println!("{}", style(integration).bold());
        for (key, value) in data.iter() {
            println!("  {} {}", dim.apply_to(format!("{}:", key)), value);
        }
    }

    Ok(())
}
