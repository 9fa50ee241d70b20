use serde::Serialize;
use std::collections::BTreeMap;

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

/// Column name to value. Source column order is not kept.
pub type QueryRow = BTreeMap<String, FieldValue>;

/// Rows in the order the data service returned them.
pub type QueryResult = Vec<QueryRow>;
