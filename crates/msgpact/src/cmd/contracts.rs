use msgpact_contract::{Direction, DirectionContract};

use crate::cmd::ContractsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_contracts, shape_summary, ContractRow, OutputFormat};

pub fn run(args: ContractsArgs, format: OutputFormat) -> CliResult<i32> {
    let contracts = args.document.load()?.project();

    let mut all = rows(&contracts.to_host);
    all.extend(rows(&contracts.to_peer));
    print_contracts(&all, format);
    Ok(SUCCESS)
}

fn rows<D: Direction>(contract: &DirectionContract<D>) -> Vec<ContractRow> {
    contract
        .iter()
        .map(|(message, shape)| ContractRow {
            direction: contract.direction(),
            message: message.to_string(),
            shape: shape_summary(shape),
        })
        .collect()
}
