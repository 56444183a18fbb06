pub mod app;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod session;
pub mod source;
pub mod state;
pub mod stats;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
