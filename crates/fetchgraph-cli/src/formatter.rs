//! Output formatting for query results.

use comfy_table::{Cell, Table};
use fetchgraph_proto::{EntityCollection, Row, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table format.
    #[default]
    Table,
    /// JSON array of rows.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a collection of flat rows.
    fn format_collection(&self, collection: &EntityCollection) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_collection(&self, collection: &EntityCollection) -> String {
        if collection.is_empty() {
            return format!("(no {} rows)", collection.entity_name);
        }

        let headers = header_keys(&collection.rows);
        let mut table = Table::new();
        table.set_header(headers.iter().map(Cell::new));

        for row in &collection.rows {
            table.add_row(headers.iter().map(|key| Cell::new(table_cell(row.get(key)))));
        }

        let mut output = format!("{}\n{} row(s)", table, collection.len());
        if collection.more_records {
            output.push_str(", more available");
        }
        output
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_collection(&self, collection: &EntityCollection) -> String {
        let rows: Vec<serde_json::Value> = collection.rows.iter().map(row_to_json).collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error }).to_string()
    }
}

/// Every key appearing in any row, in first-seen order.
///
/// Left-outer links drop their keys from rows without a match, so the
/// first row alone does not describe the result.
fn header_keys(rows: &[Row]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for attribute in &row.attributes {
            if !keys.iter().any(|key| key == &attribute.key) {
                keys.push(attribute.key.clone());
            }
        }
    }
    keys
}

fn table_cell(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Null) => "NULL".to_string(),
        Some(value) => value.to_string(),
    }
}

fn row_to_json(row: &Row) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    for attribute in &row.attributes {
        obj.insert(attribute.key.clone(), value_to_json(&attribute.value));
    }
    serde_json::Value::Object(obj)
}

/// Convert a Value to JSON.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int32(i) | Value::OptionSet(i) => serde_json::Value::Number((*i).into()),
        Value::Int64(i) | Value::DateTime(i) => serde_json::Value::Number((*i).into()),
        Value::Float64(f) | Value::Money(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(s) | Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Uuid(_) => serde_json::Value::String(value.to_string()),
        Value::EntityReference { logical_name, id } => serde_json::json!({
            "logical_name": logical_name,
            "id": Value::Uuid(*id).to_string(),
        }),
        Value::Int32Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|i| serde_json::Value::Number((*i).into()))
                .collect(),
        ),
        Value::StringArray(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|s| serde_json::Value::String(s.clone()))
                .collect(),
        ),
        Value::UuidArray(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|id| serde_json::Value::String(Value::Uuid(*id).to_string()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> EntityCollection {
        EntityCollection::new(
            "account",
            vec![
                Row::new()
                    .with("name", "Contoso")
                    .with("pc.fullname", "Ada Lovelace"),
                Row::new().with("name", "Fabrikam").with("revenue", Value::Null),
            ],
        )
    }

    #[test]
    fn test_headers_are_union_of_rows() {
        assert_eq!(
            header_keys(&sample().rows),
            vec!["name", "pc.fullname", "revenue"]
        );
    }

    #[test]
    fn test_table_output() {
        let output = TableFormatter.format_collection(&sample());
        assert!(output.contains("pc.fullname"));
        assert!(output.contains("Ada Lovelace"));
        assert!(output.contains("NULL"));
        assert!(output.ends_with("2 row(s)"));

        let empty = TableFormatter.format_collection(&EntityCollection::empty("account"));
        assert_eq!(empty, "(no account rows)");
    }

    #[test]
    fn test_json_output() {
        let output = JsonFormatter.format_collection(&sample());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                { "name": "Contoso", "pc.fullname": "Ada Lovelace" },
                { "name": "Fabrikam", "revenue": null },
            ])
        );
    }

    #[test]
    fn test_json_reference() {
        let value = Value::EntityReference {
            logical_name: "contact".to_string(),
            id: [0; 16],
        };
        assert_eq!(
            value_to_json(&value),
            serde_json::json!({
                "logical_name": "contact",
                "id": "00000000-0000-0000-0000-000000000000",
            })
        );
    }

    #[test]
    fn test_json_error() {
        assert_eq!(
            JsonFormatter.format_error("timed out"),
            r#"{"error":"timed out"}"#
        );
    }
}
