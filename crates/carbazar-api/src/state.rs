//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`, and so tests can build a router around one
//! sub-state without a database.

use carbazar_core::Config;
use carbazar_db::CarListingRepository;
use carbazar_notify::SubmissionDispatcher;
use sqlx::PgPool;
use std::sync::Arc;

// ----- Sub-state types -----

/// Database pool and the listing repository.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub listings: CarListingRepository,
}

/// Everything the submission endpoint needs to fan a dispatch out.
#[derive(Clone)]
pub struct DispatchState {
    pub dispatcher: SubmissionDispatcher,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub dispatch: DispatchState,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for DispatchState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.dispatch.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
