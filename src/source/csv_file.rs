use super::{DataSource, SourceError, Table};
use crate::models::DatasetKind;
use async_trait::async_trait;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Bundled flat-file fallback used when no warehouse is selected.
pub struct CsvSource {
    tickets_path: PathBuf,
    sla_path: PathBuf,
}

impl CsvSource {
    pub fn new(tickets_path: PathBuf, sla_path: PathBuf) -> Self {
        Self {
            tickets_path,
            sla_path,
        }
    }

    fn path(&self, kind: DatasetKind) -> &Path {
        match kind {
            DatasetKind::Tickets => &self.tickets_path,
            DatasetKind::SlaEvents => &self.sla_path,
        }
    }
}

#[async_trait]
impl DataSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn query_text(&self, kind: DatasetKind) -> String {
        format!("csv:{}", self.path(kind).display())
    }

    async fn fetch(&self, kind: DatasetKind) -> Result<Table, SourceError> {
        let path = self.path(kind);
        let bytes = fs::read(path).await.map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = parse_table(bytes.as_slice())?;
        info!(path = %path.display(), rows = table.rows.len(), "loaded csv dataset");
        Ok(table)
    }
}

/// Reads comma-separated text with a header row; empty cells become null.
pub fn parse_table<R: Read>(reader: R) -> Result<Table, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| (!cell.trim().is_empty()).then(|| cell.to_string()))
                .collect(),
        );
    }
    Ok(Table { columns, rows })
}
