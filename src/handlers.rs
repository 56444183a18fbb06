use crate::dashboard::{self, assignee_activity, sla_policies, ticket_metrics};
use crate::dates::DateRange;
use crate::errors::AppError;
use crate::filters::{filter_options, filter_records, latest_date};
use crate::models::{
    ConnectionResponse, DashboardRequest, DatasetKind, Page, PageResponse, SlaRecord, TicketRecord,
};
use crate::session::{SessionState, DEFAULT_SESSION, SESSION_HEADER};
use crate::source::{self, DataSource};
use crate::state::{AppState, Connection};
use crate::ui::render_index;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub hide_sidebar: bool,
}

pub async fn index(Query(query): Query<IndexQuery>) -> Html<String> {
    Html(render_index(query.hide_sidebar))
}

pub async fn connection(State(state): State<AppState>) -> Json<ConnectionResponse> {
    let config = &state.config;
    let (source, ready, message) = match &state.connection {
        Connection::Ready(source) => (Some(source.name()), true, None),
        Connection::Misconfigured(problem) => (None, false, Some(problem.clone())),
    };
    Json(ConnectionResponse {
        destination: config.destination,
        source,
        database: config.database.clone(),
        schema: config.schema.clone(),
        ready,
        message,
    })
}

pub async fn ticket_metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<Json<PageResponse<ticket_metrics::TicketMetrics>>, AppError> {
    let page = Page::TicketMetrics;
    let request = read_request(page, payload)?;
    let source = match ready_source(&state) {
        Ok(source) => source,
        Err(problem) => return Ok(Json(PageResponse::misconfigured(problem))),
    };

    let records = load_tickets(&state, &source).await?;
    let options = filter_options(&records, page.filter_columns());
    let session = PageSession::open(&state, &headers).await;
    let Some((range, session)) = session.resolve(page, &request, latest_date(&records))? else {
        return Ok(Json(PageResponse::incomplete_range(options)));
    };

    let filtered = filter_records(&records, &range, &request.filters);
    let body = ticket_metrics::build(
        &records,
        &filtered,
        request.attribute,
        request.years.as_deref(),
        request.week_start,
    );
    session.save(&state).await;
    Ok(Json(PageResponse::ready(range, options, body)))
}

pub async fn sla_policies(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<Json<PageResponse<sla_policies::SlaPolicies>>, AppError> {
    let page = Page::SlaPolicies;
    let request = read_request(page, payload)?;
    let source = match ready_source(&state) {
        Ok(source) => source,
        Err(problem) => return Ok(Json(PageResponse::misconfigured(problem))),
    };

    let records = load_sla_events(&state, &source).await?;
    let options = filter_options(&records, page.filter_columns());
    let session = PageSession::open(&state, &headers).await;
    let Some((range, session)) = session.resolve(page, &request, latest_date(&records))? else {
        return Ok(Json(PageResponse::incomplete_range(options)));
    };

    let filtered = filter_records(&records, &range, &request.filters);
    let body = sla_policies::build(&filtered, request.attribute, request.week_start);
    session.save(&state).await;
    Ok(Json(PageResponse::ready(range, options, body)))
}

pub async fn assignee_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<Json<PageResponse<assignee_activity::AssigneeActivity>>, AppError> {
    let page = Page::AssigneeActivity;
    let request = read_request(page, payload)?;
    let source = match ready_source(&state) {
        Ok(source) => source,
        Err(problem) => return Ok(Json(PageResponse::misconfigured(problem))),
    };

    let records = load_tickets(&state, &source).await?;
    let options = filter_options(&records, page.filter_columns());
    let session = PageSession::open(&state, &headers).await;
    let Some((range, mut session)) = session.resolve(page, &request, latest_date(&records))? else {
        return Ok(Json(PageResponse::incomplete_range(options)));
    };

    let filtered = filter_records(&records, &range, &request.filters);
    let body = assignee_activity::build(&filtered, session.state.table_page(), request.page_action);
    session.state.set_table_page(body.table.page);
    session.save(&state).await;
    Ok(Json(PageResponse::ready(range, options, body)))
}

/// Malformed bodies, including unknown filter columns, are a 400 like any
/// other invalid request.
fn read_request(
    page: Page,
    payload: Result<Json<DashboardRequest>, JsonRejection>,
) -> Result<DashboardRequest, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    dashboard::validate(page, &request)?;
    Ok(request)
}

fn ready_source(state: &AppState) -> Result<Arc<dyn DataSource>, String> {
    match &state.connection {
        Connection::Ready(source) => Ok(Arc::clone(source)),
        Connection::Misconfigured(problem) => Err(problem.clone()),
    }
}

async fn load_tickets(
    state: &AppState,
    backend: &Arc<dyn DataSource>,
) -> Result<Arc<Vec<TicketRecord>>, AppError> {
    let key = backend.query_text(DatasetKind::Tickets);
    let records = state
        .tickets
        .get_or_fetch(&key, || async {
            let records = source::load_tickets(backend.as_ref()).await?;
            info!(source = backend.name(), rows = records.len(), "loaded tickets");
            Ok::<_, source::SourceError>(records)
        })
        .await?;
    Ok(records)
}

async fn load_sla_events(
    state: &AppState,
    backend: &Arc<dyn DataSource>,
) -> Result<Arc<Vec<SlaRecord>>, AppError> {
    let key = backend.query_text(DatasetKind::SlaEvents);
    let records = state
        .sla_events
        .get_or_fetch(&key, || async {
            let records = source::load_sla_events(backend.as_ref()).await?;
            info!(source = backend.name(), rows = records.len(), "loaded SLA events");
            Ok::<_, source::SourceError>(records)
        })
        .await?;
    Ok(records)
}

/// A session snapshot taken at the start of a page request.
struct PageSession {
    id: String,
    state: SessionState,
}

impl PageSession {
    async fn open(state: &AppState, headers: &HeaderMap) -> Self {
        let id = headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SESSION)
            .to_string();
        let snapshot = state.sessions.load(&id).await;
        Self {
            id,
            state: snapshot,
        }
    }

    /// `Ok(None)` when only one of the two dates was given.
    fn resolve(
        mut self,
        page: Page,
        request: &DashboardRequest,
        latest: Option<NaiveDate>,
    ) -> Result<Option<(DateRange, Self)>, AppError> {
        let range = dashboard::resolve_range(page, request, &mut self.state, today(), latest)?;
        Ok(range.map(|range| (range, self)))
    }

    async fn save(self, state: &AppState) {
        state.sessions.store(&self.id, self.state).await;
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::PageStatus;
    use crate::source::{CsvSource, SourceError, Table};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Bundled CSV files behind a counter of how often they were fetched.
    struct CountingSource {
        inner: CsvSource,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn bundled() -> Self {
            let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
            Self {
                inner: CsvSource::new(data.join("tickets.csv"), data.join("sla_events.csv")),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DataSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn query_text(&self, kind: DatasetKind) -> String {
            self.inner.query_text(kind)
        }

        async fn fetch(&self, kind: DatasetKind) -> Result<Table, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(kind).await
        }
    }

    fn config() -> AppConfig {
        AppConfig::from_lookup(|_| None)
    }

    fn two_march_weeks() -> DashboardRequest {
        DashboardRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 3),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 16),
            ..DashboardRequest::default()
        }
    }

    fn request(body: DashboardRequest) -> Result<Json<DashboardRequest>, JsonRejection> {
        Ok(Json(body))
    }

    #[tokio::test]
    async fn misconfigured_connection_short_circuits_every_page() {
        let problem = "Snowflake needs SNOWFLAKE_TOKEN";
        let state = AppState::with_connection(
            config(),
            Connection::Misconfigured(problem.to_string()),
        );

        let Json(tickets) = ticket_metrics(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        assert_eq!(tickets.status, PageStatus::Misconfigured);
        assert_eq!(tickets.message.as_deref(), Some(problem));
        assert!(tickets.body.is_none());
        assert!(tickets.filter_options.is_empty());

        let Json(sla) = sla_policies(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        assert_eq!(sla.status, PageStatus::Misconfigured);
        assert!(sla.body.is_none());
        assert!(sla.filter_options.is_empty());

        let Json(assignees) =
            assignee_activity(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
                .await
                .unwrap();
        assert_eq!(assignees.status, PageStatus::Misconfigured);
        assert!(assignees.body.is_none());
        assert!(assignees.filter_options.is_empty());

        let Json(info) = connection(State(state)).await;
        assert!(!info.ready);
        assert_eq!(info.message.as_deref(), Some(problem));
    }

    #[tokio::test]
    async fn page_loads_within_ttl_reuse_the_fetched_dataset() {
        let source = Arc::new(CountingSource::bundled());
        let backend: Arc<dyn DataSource> = source.clone();
        let state = AppState::with_connection(config(), Connection::Ready(backend));

        let Json(first) = ticket_metrics(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        assert_eq!(first.status, PageStatus::Ready);
        assert!(first.body.is_some());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        ticket_metrics(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        assignee_activity(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        sla_policies(State(state.clone()), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        sla_policies(State(state), HeaderMap::new(), request(two_march_weeks()))
            .await
            .unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn session_header_selects_the_remembered_range() {
        let state = AppState::with_connection(
            config(),
            Connection::Ready(Arc::new(CountingSource::bundled())),
        );
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "desk-7".parse().unwrap());

        ticket_metrics(State(state.clone()), headers.clone(), request(two_march_weeks()))
            .await
            .unwrap();
        let Json(again) = ticket_metrics(State(state), headers, request(DashboardRequest::default()))
            .await
            .unwrap();
        let range = again.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }
}
