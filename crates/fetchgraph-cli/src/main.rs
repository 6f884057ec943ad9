//! fetchgraph Command-Line Client
//!
//! Runs a single raw query against a data service and prints the rows.

mod args;
mod formatter;

use std::time::Duration;

use clap::Parser;
use fetchgraph_client::{Client, ClientConfig};
use fetchgraph_core::{Conditions, RawQuery};
use fetchgraph_proto::{ColumnSet, Value};

use args::{column_set, JoinArg, OrderArg, WhereArg};
use formatter::{create_formatter, OutputFormat};

/// fetchgraph Command-Line Client
#[derive(Parser, Debug)]
#[command(name = "fetchgraph")]
#[command(version, about = "Query a fetchgraph data service")]
pub struct Args {
    /// Server address (tcp:// or ipc://); defaults to FETCHGRAPH_ADDRESS or localhost
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Root entity to query
    #[arg(short = 'e', long)]
    pub entity: String,

    /// Comma-separated root columns; all columns when omitted
    #[arg(short = 'c', long)]
    pub columns: Option<String>,

    /// Equality condition on a root column, `column=value` (repeatable);
    /// `column=null` checks for null
    #[arg(short = 'w', long = "where")]
    pub conditions: Vec<WhereArg>,

    /// Join a related entity, `entity:from:to[:alias]` (repeatable)
    #[arg(short = 'j', long = "join")]
    pub joins: Vec<JoinArg>,

    /// Sort by a root column, `column[:asc|:desc]` (repeatable)
    #[arg(long = "order")]
    pub orders: Vec<OrderArg>,

    /// Maximum number of rows
    #[arg(short = 't', long)]
    pub top: Option<u32>,

    /// Drop duplicate rows
    #[arg(long)]
    pub distinct: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fetchgraph=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let formatter = create_formatter(args.format);

    if let Err(e) = run(args).await {
        eprintln!("{}", formatter.format_error(&e.to_string()));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.host {
        Some(host) => ClientConfig::new(host),
        None => ClientConfig::from_env()?,
    };
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let format = args.format;
    let query = build_query(args);
    tracing::debug!(entity = query.entity_name(), "running query");

    let client = Client::connect(config).await?;
    let result = query.execute(&client).await;
    client.close().await;

    let collection = result?;
    println!("{}", create_formatter(format).format_collection(&collection));
    Ok(())
}

/// Assemble a raw query from the command-line flags.
///
/// Joined entities project all their columns so the output shows them.
fn build_query(args: Args) -> RawQuery {
    let mut query = RawQuery::new(args.entity).columns(column_set(args.columns.as_deref()));

    if !args.conditions.is_empty() {
        query = query.filter(|mut f| {
            for condition in args.conditions {
                f = match condition.value {
                    Value::Null => f.null(&condition.column),
                    value => f.equal(&condition.column, value),
                };
            }
            f
        });
    }

    for join in args.joins {
        query = query.join(join.entity, join.from_column, join.to_column, |j| {
            let j = j.columns(ColumnSet::All);
            match join.alias {
                Some(alias) => j.alias(alias),
                None => j,
            }
        });
    }

    for order in args.orders {
        query = query.order(order.column, order.order);
    }
    if let Some(top) = args.top {
        query = query.top(top);
    }
    if args.distinct {
        query = query.distinct();
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchgraph_proto::{ConditionOperator, JoinOperator, OrderType};
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("fetchgraph").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_minimal_query() {
        let expression = build_query(parse(&["--entity", "account"])).compile().unwrap();
        assert_eq!(expression.entity_name, "account");
        assert_eq!(expression.columns, ColumnSet::All);
        assert!(expression.link_entities.is_empty());
        assert_eq!(expression.top, None);
    }

    #[test]
    fn test_full_query() {
        let args = parse(&[
            "-e",
            "account",
            "-c",
            "name,revenue",
            "-w",
            "statecode=0",
            "-w",
            "city=Lisbon",
            "-j",
            "contact:primarycontactid:contactid:pc",
            "--order",
            "name:desc",
            "--top",
            "10",
            "--format",
            "json",
        ]);
        assert_eq!(args.format, OutputFormat::Json);

        let expression = build_query(args).compile().unwrap();
        assert_eq!(
            expression.columns,
            ColumnSet::columns(["name", "revenue", "primarycontactid"])
        );
        assert_eq!(expression.top, Some(10));
        assert_eq!(expression.orders[0].order, OrderType::Descending);

        let root_filter = &expression.filter_nodes[0];
        assert_eq!(root_filter.conditions.len(), 2);
        assert_eq!(root_filter.conditions[0].operator, ConditionOperator::Equal);
        assert_eq!(root_filter.conditions[0].values, vec![Value::Int32(0)]);
        assert_eq!(
            root_filter.conditions[1].values,
            vec![Value::String("Lisbon".to_string())]
        );

        let link = &expression.link_entities[0];
        assert_eq!(link.to_entity, "contact");
        assert_eq!(link.alias, "pc");
        assert_eq!(link.join_operator, JoinOperator::Inner);
        assert_eq!(link.columns, ColumnSet::All);
    }

    #[test]
    fn test_rejects_malformed_flags() {
        let argv = ["fetchgraph", "-e", "account", "-j", "contact"];
        assert!(Args::try_parse_from(argv).is_err());
        assert!(Args::try_parse_from(["fetchgraph"]).is_err());
    }

    #[test]
    fn test_where_null_uses_null_operator() {
        let args = parse(&["-e", "contact", "-w", "parentcustomerid=null", "-w", "city=\"null\""]);
        let expression = build_query(args).compile().unwrap();

        let conditions = &expression.filter_nodes[0].conditions;
        assert_eq!(conditions[0].column, "parentcustomerid");
        assert_eq!(conditions[0].operator, ConditionOperator::Null);
        assert!(conditions[0].values.is_empty());
        assert_eq!(conditions[1].operator, ConditionOperator::Equal);
        assert_eq!(conditions[1].values, vec![Value::String("null".to_string())]);
    }
}
