use std::fs;

use msgpact_contract::{Direction, DirectionKind};
use msgpact_sender::{Outbound, RecordingTransport, Sender};
use serde_json::Value;
use tracing::info;

use crate::cmd::{CheckArgs, DirectionArg};
use crate::exit::{io_error, send_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_accepted, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = args.document.load()?;
    let contracts = registry.project();
    let payload = resolve_payload(&args)?;

    let envelope = match args.direction {
        DirectionArg::ToHost => check(
            Sender::to_host(&contracts, RecordingTransport::new()),
            &args.message,
            &payload,
        )?,
        DirectionArg::ToPeer => check(
            Sender::to_peer(&contracts, RecordingTransport::new()),
            &args.message,
            &payload,
        )?,
    };

    let direction = DirectionKind::from(args.direction);
    info!(%direction, message = %envelope.message, "message is valid");
    print_accepted(direction, &envelope, format);
    Ok(SUCCESS)
}

fn check<D: Direction>(
    sender: Sender<D, RecordingTransport>,
    message: &str,
    payload: &Value,
) -> CliResult<Outbound> {
    sender
        .send(message, payload)
        .map_err(|err| send_error("check failed", err))?;

    sender
        .transport()
        .sent()
        .pop()
        .ok_or_else(|| CliError::new(INTERNAL, "validated message never reached the transport"))
}

fn resolve_payload(args: &CheckArgs) -> CliResult<Value> {
    if let Some(json) = &args.json {
        return serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")));
    }
    if let Some(path) = &args.file {
        let content = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return serde_json::from_str(&content).map_err(|err| {
            CliError::new(
                USAGE,
                format!("{} is not valid JSON: {err}", path.display()),
            )
        });
    }
    Err(CliError::new(USAGE, "one of --json or --file is required"))
}
