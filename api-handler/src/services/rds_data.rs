//! RDS Data API query execution.
//!
//! Statements go through `ExecuteStatement` with the cluster and secret ARNs;
//! the adapter never holds a database connection itself.

use super::{QueryError, TabularQuery};
use crate::models::{FieldValue, QueryResult, QueryRow};
use async_trait::async_trait;
use aws_sdk_rdsdata::types::{ColumnMetadata, Field};
use aws_sdk_rdsdata::Client;

#[derive(Clone)]
pub struct RdsDataQuery {
    client: Client,
    resource_arn: String,
    secret_arn: String,
    database: Option<String>,
}

impl RdsDataQuery {
    pub fn new(
        client: Client,
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: Option<String>,
    ) -> Self {
        Self {
            client,
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database,
        }
    }
}

#[async_trait]
impl TabularQuery for RdsDataQuery {
    async fn query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        tracing::info!(sql = %sql, "Executing query");

        let output = self
            .client
            .execute_statement()
            .resource_arn(&self.resource_arn)
            .secret_arn(&self.secret_arn)
            .set_database(self.database.clone())
            .sql(sql)
            // Column names come from the metadata; without it rows cannot be keyed.
            .include_result_metadata(true)
            .send()
            .await
            .map_err(|e| QueryError::Execution(Box::new(e)))?;

        let rows = decode_records(output.column_metadata(), output.records());
        tracing::debug!(row_count = rows.len(), "Query returned rows");
        Ok(rows)
    }
}

/// Zip each positional record with the column names.
///
/// Records shorter than the column list get nulls for the missing cells, so
/// every row carries the full key set.
pub fn decode_records(columns: &[ColumnMetadata], records: &[Vec<Field>]) -> QueryResult {
    let names: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| column_name(i, column))
        .collect();

    records
        .iter()
        .map(|record| {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), record.get(i).map_or(FieldValue::Null, field_value)))
                .collect::<QueryRow>()
        })
        .collect()
}

fn column_name(index: usize, column: &ColumnMetadata) -> String {
    column
        .name()
        .or_else(|| column.label())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("column_{}", index))
}

/// String, then long, then double, then boolean; everything else is null.
pub fn field_value(field: &Field) -> FieldValue {
    match field {
        Field::StringValue(s) => FieldValue::String(s.clone()),
        Field::LongValue(n) => FieldValue::Integer(*n),
        Field::DoubleValue(n) => FieldValue::Float(*n),
        Field::BooleanValue(b) => FieldValue::Boolean(*b),
        _ => FieldValue::Null,
    }
}
