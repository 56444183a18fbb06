use super::query::Dialect;
use super::{DataSource, SourceError, Table};
use crate::config::SnowflakeCredentials;
use crate::models::DatasetKind;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const STATEMENT_TIMEOUT_SECS: u64 = 60;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Runs statements through the Snowflake SQL API (v2).
pub struct SnowflakeSource {
    client: reqwest::Client,
    credentials: SnowflakeCredentials,
    database: String,
    schema: String,
}

#[derive(Debug, Deserialize)]
struct ColumnType {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    row_type: Vec<ColumnType>,
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    statement_handle: Option<String>,
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

enum Outcome {
    Done(StatementResponse),
    Running(String),
}

impl SnowflakeSource {
    pub fn new(credentials: SnowflakeCredentials, database: String, schema: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            database,
            schema,
        }
    }

    fn statements_url(&self) -> String {
        format!(
            "{}/api/v2/statements",
            self.credentials.endpoint.trim_end_matches('/')
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.credentials.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                &self.credentials.token_type,
            )
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn submit(&self, sql: &str) -> Result<Outcome, SourceError> {
        let response = self
            .authorized(self.client.post(self.statements_url()))
            .json(&serde_json::json!({
                "statement": sql,
                "timeout": STATEMENT_TIMEOUT_SECS,
                "database": self.database,
                "schema": self.schema,
                "warehouse": self.credentials.warehouse,
            }))
            .send()
            .await?;
        read_outcome(response).await
    }

    async fn status(&self, handle: &str, partition: Option<usize>) -> Result<Outcome, SourceError> {
        let mut request = self
            .authorized(self.client.get(format!("{}/{handle}", self.statements_url())));
        if let Some(partition) = partition {
            request = request.query(&[("partition", partition)]);
        }
        read_outcome(request.send().await?).await
    }
}

async fn read_outcome(response: reqwest::Response) -> Result<Outcome, SourceError> {
    let status = response.status();
    if status == StatusCode::ACCEPTED {
        let body: StatementResponse = response.json().await?;
        let handle = body.statement_handle.ok_or_else(|| {
            SourceError::Malformed("Snowflake accepted a statement without a handle".to_string())
        })?;
        return Ok(Outcome::Running(handle));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(Outcome::Done(response.json().await?))
}

/// Column names and first-partition rows of a finished statement, plus the
/// number of partitions in the result set.
fn first_partition(response: StatementResponse) -> Result<(Table, usize), SourceError> {
    let meta = response.result_set_meta_data.ok_or_else(|| {
        SourceError::Malformed("Snowflake result has no resultSetMetaData".to_string())
    })?;
    let table = Table {
        columns: meta.row_type.into_iter().map(|column| column.name).collect(),
        rows: response.data,
    };
    Ok((table, meta.partition_info.len().max(1)))
}

#[async_trait]
impl DataSource for SnowflakeSource {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn query_text(&self, kind: DatasetKind) -> String {
        Dialect::Snowflake.query(kind, &self.database, &self.schema)
    }

    async fn fetch(&self, kind: DatasetKind) -> Result<Table, SourceError> {
        let sql = self.query_text(kind);
        let mut outcome = self.submit(&sql).await?;
        let finished = loop {
            match outcome {
                Outcome::Done(response) => break response,
                Outcome::Running(handle) => {
                    debug!(%handle, "snowflake statement still running");
                    tokio::time::sleep(POLL_INTERVAL).await;
                    outcome = self.status(&handle, None).await?;
                }
            }
        };

        let handle = finished.statement_handle.clone();
        let (mut table, partitions) = first_partition(finished)?;
        if partitions > 1 {
            let handle = handle.ok_or_else(|| {
                SourceError::Malformed("partitioned Snowflake result without a handle".to_string())
            })?;
            for partition in 1..partitions {
                match self.status(&handle, Some(partition)).await? {
                    Outcome::Done(page) => table.rows.extend(page.data),
                    Outcome::Running(_) => {
                        return Err(SourceError::Malformed(format!(
                            "partition {partition} of {handle} is not ready"
                        )));
                    }
                }
            }
        }

        info!(rows = table.rows.len(), partitions, "snowflake statement finished");
        Ok(table)
    }
}
