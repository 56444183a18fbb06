use super::query::Dialect;
use super::{DataSource, SourceError, Table};
use crate::config::BigQueryCredentials;
use crate::models::DatasetKind;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

const QUERY_TIMEOUT_MS: u64 = 60_000;

/// Runs standard-SQL queries through the BigQuery REST `jobs.query` endpoint.
pub struct BigQuerySource {
    client: reqwest::Client,
    credentials: BigQueryCredentials,
    database: String,
    schema: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Schema {
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    v: Value,
}

#[derive(Debug, Deserialize)]
struct RowData {
    #[serde(default)]
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    job_reference: Option<JobReference>,
    schema: Option<Schema>,
    #[serde(default)]
    rows: Vec<RowData>,
    page_token: Option<String>,
    #[serde(default)]
    job_complete: bool,
}

impl BigQuerySource {
    pub fn new(credentials: BigQueryCredentials, database: String, schema: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            database,
            schema,
        }
    }

    fn project_url(&self) -> String {
        format!(
            "{}/projects/{}",
            self.credentials.endpoint.trim_end_matches('/'),
            self.credentials.project_id
        )
    }

    async fn start(&self, sql: &str) -> Result<QueryResponse, SourceError> {
        let response = self
            .client
            .post(format!("{}/queries", self.project_url()))
            .bearer_auth(&self.credentials.access_token)
            .json(&serde_json::json!({
                "query": sql,
                "useLegacySql": false,
                "timeoutMs": QUERY_TIMEOUT_MS,
            }))
            .send()
            .await?;
        read_response(response).await
    }

    async fn results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse, SourceError> {
        let mut params: Vec<(&str, String)> = vec![("timeoutMs", QUERY_TIMEOUT_MS.to_string())];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        if let Some(location) = &job.location {
            params.push(("location", location.clone()));
        }
        let response = self
            .client
            .get(format!("{}/queries/{}", self.project_url(), job.job_id))
            .bearer_auth(&self.credentials.access_token)
            .query(&params)
            .send()
            .await?;
        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<QueryResponse, SourceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<QueryResponse>().await?)
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn append_page(table: &mut Table, page: QueryResponse) -> Result<(), SourceError> {
    if table.columns.is_empty() {
        let schema = page
            .schema
            .ok_or_else(|| SourceError::Malformed("BigQuery response has no schema".to_string()))?;
        table.columns = schema.fields.into_iter().map(|field| field.name).collect();
    }
    table.rows.extend(
        page.rows
            .into_iter()
            .map(|row| row.f.into_iter().map(|cell| cell_text(cell.v)).collect()),
    );
    Ok(())
}

#[async_trait]
impl DataSource for BigQuerySource {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn query_text(&self, kind: DatasetKind) -> String {
        Dialect::BigQuery.query(kind, &self.database, &self.schema)
    }

    async fn fetch(&self, kind: DatasetKind) -> Result<Table, SourceError> {
        let sql = self.query_text(kind);
        let mut response = self.start(&sql).await?;
        let job = response
            .job_reference
            .clone()
            .ok_or_else(|| SourceError::Malformed("BigQuery response has no job reference".to_string()))?;

        let mut table = Table::default();
        loop {
            if !response.job_complete {
                debug!(job_id = %job.job_id, "bigquery job still running");
                response = self.results(&job, None).await?;
                continue;
            }
            let next_page = response.page_token.take();
            append_page(&mut table, response)?;
            match next_page {
                Some(token) => response = self.results(&job, Some(&token)).await?,
                None => break,
            }
        }

        info!(job_id = %job.job_id, rows = table.rows.len(), "bigquery query finished");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_append_rows_under_first_schema() {
        let first: QueryResponse = serde_json::from_str(
            r#"{
                "jobReference": {"projectId": "p", "jobId": "job_1", "location": "US"},
                "schema": {"fields": [{"name": "ticket_id", "type": "INTEGER"}, {"name": "assignee_name", "type": "STRING"}]},
                "rows": [{"f": [{"v": "1"}, {"v": "Pam"}]}, {"f": [{"v": "2"}, {"v": null}]}],
                "pageToken": "abc",
                "jobComplete": true
            }"#,
        )
        .unwrap();
        let second: QueryResponse = serde_json::from_str(
            r#"{"rows": [{"f": [{"v": "3"}, {"v": "Jim"}]}], "jobComplete": true}"#,
        )
        .unwrap();

        assert_eq!(first.page_token.as_deref(), Some("abc"));
        assert_eq!(first.job_reference.as_ref().map(|j| j.job_id.as_str()), Some("job_1"));

        let mut table = Table::default();
        append_page(&mut table, first).unwrap();
        append_page(&mut table, second).unwrap();
        assert_eq!(table.columns, vec!["ticket_id", "assignee_name"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][1], None);
        assert_eq!(table.rows[2][1].as_deref(), Some("Jim"));
    }

    #[test]
    fn first_page_without_schema_is_malformed() {
        let page: QueryResponse = serde_json::from_str(r#"{"jobComplete": true}"#).unwrap();
        let err = append_page(&mut Table::default(), page).unwrap_err();
        assert!(err.is_upstream());
    }

    #[test]
    fn non_string_cells_keep_their_json_text() {
        assert_eq!(cell_text(Value::Bool(true)).as_deref(), Some("true"));
        assert_eq!(cell_text(Value::Null), None);
    }

    #[test]
    fn query_text_uses_bigquery_dialect() {
        let source = BigQuerySource::new(
            BigQueryCredentials {
                endpoint: "http://localhost".to_string(),
                project_id: "p".to_string(),
                access_token: "t".to_string(),
            },
            "proj".to_string(),
            "zendesk".to_string(),
        );
        assert!(source.query_text(DatasetKind::Tickets).contains("`proj.zendesk.zendesk__ticket_metrics`"));
        assert_eq!(source.project_url(), "http://localhost/projects/p");
    }
}
