//! Path command - shows the transformer chain between two subject kinds.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use super::Context;

/// Arguments for the path command.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Subject kind to convert from
    pub source: String,

    /// Subject kind to convert to
    pub target: String,
}

#[derive(Debug, Serialize)]
struct PathOutput<'a> {
    source: &'a str,
    target: &'a str,
    hops: usize,
    kinds: Vec<&'a str>,
}

/// Run the path command.
pub fn run(args: PathArgs, ctx: &Context) -> Result<()> {
    let (registry, _) = ctx.registry()?;
    let path = registry.find_transform_path(&args.source, &args.target)?;

    let kinds = if path.is_empty() {
        vec![args.source.as_str()]
    } else {
        path.kinds()
    };

    if ctx.json_output {
        let output = PathOutput {
            source: &args.source,
            target: &args.target,
            hops: path.len(),
            kinds,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let dim = Style::new().dim();
        println!("{}", kinds.join(" -> "));
        if ctx.verbose {
            println!("{}", dim.apply_to(format!("{} hop(s)", path.len())));
        }
    }

    Ok(())
}
