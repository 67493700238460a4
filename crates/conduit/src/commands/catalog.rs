//! Catalog command - lists what the registry offers.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::Context;

/// Arguments for the catalog command.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only show entries namespaced by this integration
    #[arg(short, long)]
    pub integration: Option<String>,
}

/// Run the catalog command.
pub fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let (registry, _) = ctx.registry()?;
    let mut catalog = registry.catalog();
    if let Some(integration) = &args.integration {
        catalog = catalog.for_integration(integration);
    }

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let cyan = Style::new().cyan();

    println!();
    println!("{}", style("Subjects").bold());
    for subject in &catalog.subjects {
        println!("  {} {}", cyan.apply_to(&subject.id), dim.apply_to(&subject.name));
        if ctx.verbose {
            for arg in &subject.arguments {
                let marker = if arg.required { "" } else { "?" };
                println!("      {}{}: {}", arg.name, marker, arg.ty);
            }
        }
    }

    println!();
    println!("{}", style("Triggers").bold());
    for trigger in &catalog.triggers {
        println!(
            "  {} {} {}",
            cyan.apply_to(&trigger.id),
            dim.apply_to("emits"),
            trigger.subject
        );
    }

    println!();
    println!("{}", style("Transformers").bold());
    for edge in &catalog.transformers {
        println!("  {} -> {}", edge.source, edge.target);
    }

    println!();
    println!("{}", style("Context factories").bold());
    for id in &catalog.context_factories {
        println!("  {}", id);
    }

    if catalog.is_empty() {
        println!();
        println!("  {}", dim.apply_to("(nothing registered)"));
    }
    println!();

    Ok(())
}
