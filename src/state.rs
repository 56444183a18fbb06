use crate::cache::QueryCache;
use crate::config::AppConfig;
use crate::models::{SlaRecord, TicketRecord};
use crate::session::SessionStore;
use crate::source::{build_source, DataSource};
use std::sync::Arc;
use tracing::{info, warn};

/// Either a usable backend or the reason none could be built.
#[derive(Clone)]
pub enum Connection {
    Ready(Arc<dyn DataSource>),
    Misconfigured(String),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub connection: Connection,
    pub tickets: Arc<QueryCache<Vec<TicketRecord>>>,
    pub sla_events: Arc<QueryCache<Vec<SlaRecord>>>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let connection = match build_source(&config) {
            Ok(source) => {
                info!(source = source.name(), "data source ready");
                Connection::Ready(source)
            }
            Err(problem) => {
                warn!("data source misconfigured: {problem}");
                Connection::Misconfigured(problem)
            }
        };
        Self::with_connection(config, connection)
    }

    pub fn with_connection(config: AppConfig, connection: Connection) -> Self {
        let ttl = config.cache_ttl;
        let session_ttl = config.session_ttl;
        Self {
            config: Arc::new(config),
            connection,
            tickets: Arc::new(QueryCache::new(ttl)),
            sla_events: Arc::new(QueryCache::new(ttl)),
            sessions: SessionStore::new(session_ttl),
        }
    }
}
