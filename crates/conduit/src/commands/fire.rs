//! Fire command - runs a raw event through a trigger.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use conduit_automation::SubjectInstance;

use super::{Context, parse_object};

/// Arguments for the fire command.
#[derive(Args, Debug)]
pub struct FireArgs {
    /// Trigger identifier
    pub trigger: String,

    /// Raw event payload (JSON object)
    #[arg(long, short)]
    pub payload: String,

    /// Workflow step arguments narrowing the trigger (JSON object)
    #[arg(long, default_value = "{}")]
    pub step_args: String,
}

#[derive(Debug, Serialize)]
struct FireOutput<'a> {
    trigger: &'a str,
    triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a SubjectInstance>,
}

/// Run the fire command.
pub fn run(args: FireArgs, ctx: &Context) -> Result<()> {
    let payload = parse_object("payload", &args.payload)?;
    let step_args = parse_object("step-args", &args.step_args)?;

    let (registry, _) = ctx.registry()?;
    let subject = registry.fire(&args.trigger, &payload, &step_args)?;

    if ctx.json_output {
        let output = FireOutput {
            trigger: &args.trigger,
            triggered: subject.is_some(),
            subject: subject.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    match subject {
        Some(subject) => {
            println!("{}", subject.kind);
            println!("{}", serde_json::to_string_pretty(&subject.args)?);
        }
        None => println!(
            "{}",
            dim.apply_to(format!("{} not triggered by this event", args.trigger))
        ),
    }

    Ok(())
}
