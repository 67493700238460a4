//! Check command - boots the registry and reports its integrity.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use conduit_automation::{AutomationError, BootReport, RegistryStats, ValidationMode};

use super::Context;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {}

#[derive(Debug, Serialize)]
struct CheckOutput {
    ok: bool,
    validation: ValidationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<BootReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<RegistryStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    problems: Vec<String>,
}

/// Run the check command.
pub fn run(_args: CheckArgs, ctx: &Context) -> Result<()> {
    let validation = ctx.config.registry().validation;
    let booted = conduit_integrations::build_registry(&ctx.config);

    let output = match &booted {
        Ok((registry, report)) => CheckOutput {
            ok: true,
            validation,
            report: Some(report.clone()),
            stats: Some(registry.stats()),
            problems: Vec::new(),
        },
        Err(AutomationError::Integrity { dangling }) => CheckOutput {
            ok: false,
            validation,
            report: None,
            stats: None,
            problems: dangling.iter().map(ToString::to_string).collect(),
        },
        Err(e) => CheckOutput {
            ok: false,
            validation,
            report: None,
            stats: None,
            problems: vec![e.to_string()],
        },
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human(&output);
    }

    if !output.ok {
        bail!("registry check failed with {} problem(s)", output.problems.len());
    }
    Ok(())
}

fn print_human(output: &CheckOutput) {
    let green = Style::new().green();
    let red = Style::new().red();
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Registry check").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!("  {} {:?}", dim.apply_to("Validation:"), output.validation);

    if let Some(report) = &output.report {
        println!(
            "  {} {}",
            dim.apply_to("Registered:"),
            report.registered.join(", ")
        );
        if !report.skipped.is_empty() {
            println!("  {} {}", dim.apply_to("Skipped:"), report.skipped.join(", "));
        }
    }

    if let Some(stats) = &output.stats {
        println!(
            "  {} {} subjects, {} triggers, {} transformers, {} context factories",
            dim.apply_to("Components:"),
            stats.subjects,
            stats.triggers,
            stats.transformers,
            stats.context_factories
        );
    }

    println!();
    if output.ok {
        println!("  {}", green.apply_to("● ready"));
    } else {
        println!("  {}", red.apply_to("● not ready"));
        for problem in &output.problems {
            println!("    - {}", problem);
        }
    }
    println!();
}
