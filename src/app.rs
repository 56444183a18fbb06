use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/connection", get(handlers::connection))
        .route("/api/tickets/metrics", post(handlers::ticket_metrics))
        .route("/api/sla/policies", post(handlers::sla_policies))
        .route("/api/assignees/activity", post(handlers::assignee_activity))
        .with_state(state)
}
