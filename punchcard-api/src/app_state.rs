use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::TrackerSettings,
    domain::{
        ports::outbound::SessionStore,
        services::{Reports, SessionTracker},
        WorkClock,
    },
    repositories::PostgresSessionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<PgPool>,
    pub clock: WorkClock,
    pub tracker: Arc<SessionTracker>,
    pub reports: Arc<Reports>,
}

impl AppState {
    pub fn new(db_pool: PgPool, tracker_settings: &TrackerSettings) -> Result<Self, config::ConfigError> {
        let clock = tracker_settings.clock()?;
        let store: Arc<dyn SessionStore> = Arc::new(PostgresSessionStore::new(db_pool.clone()));

        Ok(Self {
            db_pool: Arc::new(db_pool),
            clock: clock.clone(),
            tracker: Arc::new(SessionTracker::new(Arc::clone(&store), clock.clone())),
            reports: Arc::new(Reports::new(store, clock)),
        })
    }
}
