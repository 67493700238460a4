//! Convert command - applies a transformer chain to subject arguments.

use anyhow::Result;
use clap::Args;
use console::Style;

use conduit_automation::SubjectInstance;

use super::{Context, parse_object};

/// Arguments for the convert command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Subject kind of the input
    pub source: String,

    /// Subject kind to produce
    pub target: String,

    /// Input subject arguments (JSON object)
    #[arg(long, short)]
    pub args: String,
}

/// Run the convert command.
pub fn run(args: ConvertArgs, ctx: &Context) -> Result<()> {
    let input = SubjectInstance::new(&args.source, parse_object("args", &args.args)?);

    let (registry, _) = ctx.registry()?;
    if ctx.verbose && !ctx.json_output {
        let path = registry.find_transform_path(&args.source, &args.target)?;
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(format!("via {}", path.kinds().join(" -> "))));
    }

    let output = registry.transform(&input, &args.target)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.kind);
        println!("{}", serde_json::to_string_pretty(&output.args)?);
    }

    Ok(())
}
