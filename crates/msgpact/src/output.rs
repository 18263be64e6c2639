use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use msgpact_contract::DirectionKind;
use msgpact_schema::Shape;
use msgpact_sender::Outbound;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct AcceptedOutput<'a> {
    direction: DirectionKind,
    valid: bool,
    #[serde(flatten)]
    envelope: &'a Outbound,
}

/// One message of one direction contract.
#[derive(Debug, Clone, Serialize)]
pub struct ContractRow {
    pub direction: DirectionKind,
    pub message: String,
    pub shape: String,
}

pub fn print_accepted(direction: DirectionKind, envelope: &Outbound, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = AcceptedOutput {
                direction,
                valid: true,
                envelope,
            };
            println!("{}", to_json(&out));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "MESSAGE", "STATUS", "PAYLOAD"])
                .add_row(vec![
                    direction.to_string(),
                    envelope.message.clone(),
                    "valid".to_string(),
                    envelope.payload.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "direction={} message={} valid=true payload={}",
                direction, envelope.message, envelope.payload
            );
        }
    }
}

pub fn print_contracts(rows: &[ContractRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(&rows)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "MESSAGE", "SHAPE"]);
            for row in rows {
                table.add_row(vec![
                    row.direction.to_string(),
                    row.message.clone(),
                    row.shape.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!("{} {} {}", row.direction, row.message, row.shape);
            }
        }
    }
}

/// Schemas are JSON in every format; only the layout changes.
pub fn print_schemas(schemas: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(schemas)),
        OutputFormat::Table | OutputFormat::Pretty => println!(
            "{}",
            serde_json::to_string_pretty(schemas).unwrap_or_else(|_| "{}".to_string())
        ),
    }
}

/// One-line rendering of a shape, e.g. `{id, name, etc?: {key}}`.
pub fn shape_summary(shape: &Shape) -> String {
    match shape {
        Shape::Primitive(kind) => kind.to_string(),
        Shape::Tuple(items) => {
            let items: Vec<String> = items.iter().map(shape_summary).collect();
            format!("[{}]", items.join(", "))
        }
        Shape::Structure(structure) => {
            let fields: Vec<String> = structure
                .fields()
                .iter()
                .map(|field| {
                    let marker = if field.optional { "?" } else { "" };
                    match &field.shape {
                        Shape::Structure(_) | Shape::Tuple(_) => {
                            format!("{}{marker}: {}", field.name, shape_summary(&field.shape))
                        }
                        _ => format!("{}{marker}", field.name),
                    }
                })
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Shape::Leaf(_) => "leaf".to_string(),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
