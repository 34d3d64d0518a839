use atty::Stream;
use clap::Parser;
use color_eyre::Result;
use serde_json::{json, Value};
use venvy_core::{CommandStatus, ExecutionOutcome};

mod cli;
mod dispatch;
mod style;

use cli::VenvyCli;
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = VenvyCli::parse();
    init_tracing(cli.verbose);

    let outcome = dispatch::dispatch(&cli)?;
    let code = emit_output(&cli, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = format!("venvy={level},venvy_core={level},venvy_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &VenvyCli, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    };

    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = json!({
            "status": outcome.status,
            "message": outcome.message,
            "details": outcome.details,
            "code": code,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        if is_passthrough(&outcome.details) {
            println!("{}", outcome.message);
        } else {
            println!("{}", style.status(&outcome.status, &outcome.message));
        }
    } else if code != 0 {
        eprintln!("{}", outcome.message);
    }

    Ok(code)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
