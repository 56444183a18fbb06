use crate::dates::DateRange;
use crate::models::Page;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";

/// Interaction state remembered for one browser session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    date_overrides: HashMap<Page, DateRange>,
    table_page: usize,
}

impl SessionState {
    pub fn date_override(&self, page: Page) -> Option<DateRange> {
        self.date_overrides.get(&page).copied()
    }

    pub fn set_date_override(&mut self, page: Page, range: DateRange) {
        self.date_overrides.insert(page, range);
    }

    pub fn table_page(&self) -> usize {
        self.table_page
    }

    pub fn set_table_page(&mut self, page: usize) {
        self.table_page = page;
    }
}

struct SessionEntry {
    touched: Instant,
    state: SessionState,
}

/// Sessions idle for longer than `ttl` read as empty and are pruned on the next store.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Snapshot of a session; unknown or expired ids start from the empty state.
    pub async fn load(&self, id: &str) -> SessionState {
        self.load_at(id, Instant::now()).await
    }

    pub async fn load_at(&self, id: &str, now: Instant) -> SessionState {
        self.sessions
            .lock()
            .await
            .get(id)
            .filter(|entry| now.duration_since(entry.touched) < self.ttl)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    pub async fn store(&self, id: &str, state: SessionState) {
        self.store_at(id, state, Instant::now()).await;
    }

    pub async fn store_at(&self, id: &str, state: SessionState, now: Instant) {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.touched) < self.ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, live = sessions.len(), "expired sessions dropped");
        }
        sessions.insert(id.to_string(), SessionEntry { touched: now, state });
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn overrides_are_per_session_and_page() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
        )
        .unwrap();

        let mut state = store.load("alice").await;
        state.set_date_override(Page::SlaPolicies, range);
        state.set_table_page(2);
        store.store("alice", state).await;

        let alice = store.load("alice").await;
        assert_eq!(alice.date_override(Page::SlaPolicies), Some(range));
        assert_eq!(alice.date_override(Page::TicketMetrics), None);
        assert_eq!(alice.table_page(), 2);

        let bob = store.load("bob").await;
        assert_eq!(bob.date_override(Page::SlaPolicies), None);
        assert_eq!(bob.table_page(), 0);
    }

    #[tokio::test]
    async fn idle_sessions_expire_and_are_pruned() {
        let store = SessionStore::new(Duration::from_secs(60));
        let start = Instant::now();

        let mut stale = SessionState::default();
        stale.set_table_page(3);
        store.store_at("stale", stale, start).await;
        for i in 0..100 {
            store.store_at(&format!("burst-{i}"), SessionState::default(), start).await;
        }
        assert_eq!(store.len().await, 101);

        let later = start + Duration::from_secs(45);
        let mut live = SessionState::default();
        live.set_table_page(1);
        store.store_at("live", live, later).await;
        assert_eq!(store.len().await, 102);

        let after_expiry = start + Duration::from_secs(61);
        assert_eq!(store.load_at("stale", after_expiry).await.table_page(), 0);
        assert_eq!(store.load_at("live", after_expiry).await.table_page(), 1);

        store
            .store_at("fresh", SessionState::default(), after_expiry)
            .await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.load_at("live", after_expiry).await.table_page(), 1);
    }
}
