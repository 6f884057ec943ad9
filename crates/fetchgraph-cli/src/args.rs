//! Parsing of the query flags into core builder inputs.

use std::str::FromStr;

use fetchgraph_proto::{ColumnSet, OrderType, Value};

/// Errors from malformed query flags.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ArgError {
    #[error("expected `column=value`, got {0:?}")]
    Condition(String),

    #[error("expected `entity:from:to[:alias]`, got {0:?}")]
    Join(String),

    #[error("expected `column[:asc|:desc]`, got {0:?}")]
    Order(String),
}

/// An equality condition from `--where column=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereArg {
    pub column: String,
    pub value: Value,
}

impl FromStr for WhereArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, raw) = s
            .split_once('=')
            .ok_or_else(|| ArgError::Condition(s.to_string()))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(ArgError::Condition(s.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            value: parse_value(raw.trim()),
        })
    }
}

/// A link from `--join entity:from:to[:alias]`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinArg {
    pub entity: String,
    pub from_column: String,
    pub to_column: String,
    pub alias: Option<String>,
}

impl FromStr for JoinArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(ArgError::Join(s.to_string()));
        }
        match parts.as_slice() {
            [entity, from, to] => Ok(Self {
                entity: entity.to_string(),
                from_column: from.to_string(),
                to_column: to.to_string(),
                alias: None,
            }),
            [entity, from, to, alias] => Ok(Self {
                entity: entity.to_string(),
                from_column: from.to_string(),
                to_column: to.to_string(),
                alias: Some(alias.to_string()),
            }),
            _ => Err(ArgError::Join(s.to_string())),
        }
    }
}

/// A sort key from `--order column[:desc]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArg {
    pub column: String,
    pub order: OrderType,
}

impl FromStr for OrderArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, order) = match s.split_once(':') {
            Some((column, "asc")) => (column, OrderType::Ascending),
            Some((column, "desc")) => (column, OrderType::Descending),
            Some(_) => return Err(ArgError::Order(s.to_string())),
            None => (s, OrderType::Ascending),
        };
        if column.is_empty() {
            return Err(ArgError::Order(s.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            order,
        })
    }
}

/// Turn `--columns a,b,c` into a column set. No flag projects everything.
pub fn column_set(columns: Option<&str>) -> ColumnSet {
    match columns {
        None => ColumnSet::All,
        Some(list) => ColumnSet::columns(
            list.split(',')
                .map(str::trim)
                .filter(|column| !column.is_empty()),
        ),
    }
}

/// Literal operands: `null`, booleans, integers, otherwise a string.
/// Quotes force a string.
fn parse_value(raw: &str) -> Value {
    if let Some(quoted) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::String(quoted.to_string());
    }
    match raw {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i32>() {
        return Value::Int32(n);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int64(n);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_where_literals() {
        let arg: WhereArg = "statecode=0".parse().unwrap();
        assert_eq!(arg.column, "statecode");
        assert_eq!(arg.value, Value::Int32(0));

        let arg: WhereArg = "revenue=5000000000".parse().unwrap();
        assert_eq!(arg.value, Value::Int64(5_000_000_000));

        let arg: WhereArg = "donotemail=false".parse().unwrap();
        assert_eq!(arg.value, Value::Bool(false));

        let arg: WhereArg = "name=\"42\"".parse().unwrap();
        assert_eq!(arg.value, Value::String("42".to_string()));

        let arg: WhereArg = "city = Lisbon".parse().unwrap();
        assert_eq!(arg.column, "city");
        assert_eq!(arg.value, Value::String("Lisbon".to_string()));
    }

    #[test]
    fn test_where_requires_column() {
        assert!(matches!("=1".parse::<WhereArg>(), Err(ArgError::Condition(_))));
        assert!(matches!("name".parse::<WhereArg>(), Err(ArgError::Condition(_))));
    }

    #[test]
    fn test_join_forms() {
        let arg: JoinArg = "contact:primarycontactid:contactid".parse().unwrap();
        assert_eq!(
            arg,
            JoinArg {
                entity: "contact".to_string(),
                from_column: "primarycontactid".to_string(),
                to_column: "contactid".to_string(),
                alias: None,
            }
        );

        let arg: JoinArg = "contact:primarycontactid:contactid:pc".parse().unwrap();
        assert_eq!(arg.alias.as_deref(), Some("pc"));

        assert!("contact:primarycontactid".parse::<JoinArg>().is_err());
        assert!("contact::contactid".parse::<JoinArg>().is_err());
        assert!("a:b:c:d:e".parse::<JoinArg>().is_err());
    }

    #[test]
    fn test_order_forms() {
        let arg: OrderArg = "createdon:desc".parse().unwrap();
        assert_eq!(arg.order, OrderType::Descending);
        let arg: OrderArg = "name".parse().unwrap();
        assert_eq!(arg.order, OrderType::Ascending);
        assert!("name:sideways".parse::<OrderArg>().is_err());
    }

    #[test]
    fn test_column_set() {
        assert_eq!(column_set(None), ColumnSet::All);
        assert_eq!(
            column_set(Some("name, city,,")),
            ColumnSet::columns(["name", "city"])
        );
    }
}
