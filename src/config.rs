use crate::models::Destination;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
pub const DEFAULT_BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Sidebar placeholders that mean "not filled in".
const PLACEHOLDERS: &[&str] = &["", "None", "Database", "Schema"];

#[derive(Debug, Clone)]
pub struct BigQueryCredentials {
    pub endpoint: String,
    pub project_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct SnowflakeCredentials {
    pub endpoint: String,
    pub token: String,
    pub token_type: String,
    pub warehouse: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub destination: Destination,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub tickets_csv: PathBuf,
    pub sla_csv: PathBuf,
    pub cache_ttl: Duration,
    pub session_ttl: Duration,
    pub bigquery: Option<BigQueryCredentials>,
    pub snowflake: Option<SnowflakeCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let destination = lookup("DESK_DESTINATION")
            .map(|value| Destination::parse(&value))
            .unwrap_or(Destination::Csv);
        let cache_ttl = lookup("DESK_CACHE_TTL_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        let session_ttl = lookup("DESK_SESSION_TTL_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        let bigquery = match (lookup("BIGQUERY_PROJECT"), lookup("BIGQUERY_ACCESS_TOKEN")) {
            (Some(project_id), Some(access_token)) => Some(BigQueryCredentials {
                endpoint: lookup("BIGQUERY_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_BIGQUERY_ENDPOINT.to_string()),
                project_id,
                access_token,
            }),
            _ => None,
        };

        let snowflake = lookup("SNOWFLAKE_TOKEN").and_then(|token| {
            let endpoint = lookup("SNOWFLAKE_ENDPOINT").or_else(|| {
                lookup("SNOWFLAKE_ACCOUNT")
                    .map(|account| format!("https://{account}.snowflakecomputing.com"))
            })?;
            Some(SnowflakeCredentials {
                endpoint,
                token,
                token_type: lookup("SNOWFLAKE_TOKEN_TYPE").unwrap_or_else(|| "OAUTH".to_string()),
                warehouse: lookup("SNOWFLAKE_WAREHOUSE"),
            })
        });

        Self {
            port,
            destination,
            database: lookup("DESK_DATABASE").and_then(meaningful),
            schema: lookup("DESK_SCHEMA").and_then(meaningful),
            tickets_csv: lookup("DESK_TICKETS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/tickets.csv")),
            sla_csv: lookup("DESK_SLA_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/sla_events.csv")),
            cache_ttl: Duration::from_secs(cache_ttl),
            session_ttl: Duration::from_secs(session_ttl),
            bigquery,
            snowflake,
        }
    }

    /// Why the configured warehouse cannot be queried, if it cannot.
    pub fn connection_problem(&self) -> Option<String> {
        if !self.destination.is_warehouse() {
            return None;
        }
        if self.database.is_none() || self.schema.is_none() {
            return Some(
                "To query your own warehouse, set DESK_DATABASE and DESK_SCHEMA for the selected destination."
                    .to_string(),
            );
        }
        match self.destination {
            Destination::BigQuery if self.bigquery.is_none() => Some(
                "BigQuery needs BIGQUERY_PROJECT and BIGQUERY_ACCESS_TOKEN.".to_string(),
            ),
            Destination::Snowflake if self.snowflake.is_none() => Some(
                "Snowflake needs SNOWFLAKE_TOKEN and SNOWFLAKE_ACCOUNT (or SNOWFLAKE_ENDPOINT)."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

fn meaningful(value: String) -> Option<String> {
    let trimmed = value.trim();
    if PLACEHOLDERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
