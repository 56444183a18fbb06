//! Interchangeable backends that fetch the fixed-shape ticket and SLA tables.

pub mod bigquery;
pub mod csv_file;
pub mod decode;
pub mod query;
pub mod snowflake;

use crate::config::AppConfig;
use crate::models::{DatasetKind, Destination, SlaRecord, TicketRecord};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use bigquery::BigQuerySource;
pub use csv_file::CsvSource;
pub use snowflake::SnowflakeSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("warehouse request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("warehouse returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected warehouse response: {0}")]
    Malformed(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("row {row}: cannot parse {column} from {value:?}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
}

impl SourceError {
    /// Local file problems are ours; everything else came back from a warehouse.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SourceError::Http(_) | SourceError::Api { .. } | SourceError::Malformed(_)
        )
    }
}

/// Untyped result set: column names plus rows of optional text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Column lookup ignores case; warehouses disagree on identifier casing.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Text identifying what `fetch` runs; doubles as the memoization key.
    fn query_text(&self, kind: DatasetKind) -> String;

    async fn fetch(&self, kind: DatasetKind) -> Result<Table, SourceError>;
}

pub async fn load_tickets(source: &dyn DataSource) -> Result<Vec<TicketRecord>, SourceError> {
    let table = source.fetch(DatasetKind::Tickets).await?;
    decode::decode_tickets(&table)
}

pub async fn load_sla_events(source: &dyn DataSource) -> Result<Vec<SlaRecord>, SourceError> {
    let table = source.fetch(DatasetKind::SlaEvents).await?;
    decode::decode_sla_events(&table)
}

/// Builds the backend the configuration selects, or explains why it cannot.
pub fn build_source(config: &AppConfig) -> Result<Arc<dyn DataSource>, String> {
    if let Some(problem) = config.connection_problem() {
        return Err(problem);
    }
    let database = config.database.clone().unwrap_or_default();
    let schema = config.schema.clone().unwrap_or_default();

    let source: Arc<dyn DataSource> = match (config.destination, &config.bigquery, &config.snowflake) {
        (Destination::BigQuery, Some(credentials), _) => {
            Arc::new(BigQuerySource::new(credentials.clone(), database, schema))
        }
        (Destination::Snowflake, _, Some(credentials)) => {
            Arc::new(SnowflakeSource::new(credentials.clone(), database, schema))
        }
        _ => Arc::new(CsvSource::new(
            config.tickets_csv.clone(),
            config.sla_csv.clone(),
        )),
    };
    Ok(source)
}
