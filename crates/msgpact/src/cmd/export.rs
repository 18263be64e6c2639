use msgpact_contract::{Direction, DirectionContract};
use serde_json::{Map, Value};

use crate::cmd::{DirectionArg, ExportArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_schemas, OutputFormat};

pub fn run(args: ExportArgs, format: OutputFormat) -> CliResult<i32> {
    let contracts = args.document.load()?.project();

    let schemas = match args.direction {
        DirectionArg::ToHost => schemas(&contracts.to_host),
        DirectionArg::ToPeer => schemas(&contracts.to_peer),
    };
    print_schemas(&schemas, format);
    Ok(SUCCESS)
}

/// Message name to JSON Schema, in declaration order.
fn schemas<D: Direction>(contract: &DirectionContract<D>) -> Value {
    let strict = contract.config().strict_mode;
    let schemas: Map<String, Value> = contract
        .iter()
        .map(|(message, shape)| (message.to_string(), shape.to_json_schema(strict)))
        .collect();
    Value::Object(schemas)
}
