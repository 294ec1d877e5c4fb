use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use super::catalog::STATUS_CATALOG;
use super::domain::{ApplicationId, JobApplicationView, StatusDefinition, UserId};
use super::filter::{FilterCriteria, FilterEngine, FilterOptions};
use super::loader::{DashboardLoader, LoadError};
use super::pagination::{Page, PageRequest};
use super::retry::FetchPolicy;
use super::session::{DashboardSession, WithdrawError};
use super::source::BoardSource;
use crate::config::AppConfig;

pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

struct SessionEntry<S> {
    session: Arc<DashboardSession<S>>,
    last_seen: Instant,
}

/// Service owning the board source and one dashboard session per job seeker.
///
/// Sessions idle for longer than the idle timeout are dropped when a new one
/// is opened, and the map never holds more than `max_sessions` entries.
pub struct DashboardService<S> {
    loader: Arc<DashboardLoader<S>>,
    engine: FilterEngine,
    page_size: usize,
    view_ttl: Duration,
    idle_timeout: Duration,
    max_sessions: usize,
    sessions: Mutex<HashMap<UserId, SessionEntry<S>>>,
}

impl<S> DashboardService<S>
where
    S: BoardSource + 'static,
{
    /// Views are rebuilt on every read until [`Self::with_view_ttl`] says otherwise.
    pub fn new(source: Arc<S>, policy: FetchPolicy, engine: FilterEngine, page_size: usize) -> Self {
        Self {
            loader: Arc::new(DashboardLoader::new(source, policy)),
            engine,
            page_size,
            view_ttl: Duration::ZERO,
            idle_timeout: DEFAULT_SESSION_IDLE,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(source: Arc<S>, config: &AppConfig) -> Self {
        Self::new(
            source,
            config.board.fetch_policy(),
            FilterEngine::new(config.dashboard.undisclosed_salary),
            config.dashboard.page_size,
        )
        .with_view_ttl(config.dashboard.view_ttl)
        .with_session_limits(config.dashboard.session_idle, config.dashboard.max_sessions)
    }

    pub fn with_view_ttl(mut self, view_ttl: Duration) -> Self {
        self.view_ttl = view_ttl;
        self
    }

    pub fn with_session_limits(mut self, idle_timeout: Duration, max_sessions: usize) -> Self {
        self.idle_timeout = idle_timeout;
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns the user's session, opening an empty one on first access.
    pub fn session(&self, user: &UserId) -> Arc<DashboardSession<S>> {
        let now = Instant::now();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(entry) = sessions.get_mut(user) {
            entry.last_seen = now;
            return entry.session.clone();
        }

        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let session = Arc::new(DashboardSession::new(
            user.clone(),
            self.loader.clone(),
            self.engine,
            self.view_ttl,
        ));
        sessions.insert(
            user.clone(),
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        debug!(%user, open = sessions.len(), "dashboard session opened");
        session
    }

    pub async fn list(
        &self,
        user: &UserId,
        criteria: &FilterCriteria,
        page: Option<PageRequest>,
        refresh: bool,
    ) -> Result<Page<JobApplicationView>, LoadError> {
        let session = self.session(user);
        if refresh {
            session.refresh().await?;
        }
        let page = page.unwrap_or_else(|| PageRequest::new(1, self.page_size));
        session.list(criteria, page).await
    }

    pub async fn detail(
        &self,
        user: &UserId,
        id: &ApplicationId,
    ) -> Result<Option<JobApplicationView>, LoadError> {
        self.session(user).select(id).await
    }

    pub async fn close_detail(&self, user: &UserId) {
        self.session(user).close_detail().await;
    }

    pub async fn withdraw(
        &self,
        user: &UserId,
        id: &ApplicationId,
    ) -> Result<JobApplicationView, WithdrawError> {
        self.session(user).withdraw(id).await
    }

    pub async fn filter_options(&self, user: &UserId) -> Result<FilterOptions, LoadError> {
        self.session(user).filter_options().await
    }

    pub async fn job_locations(&self) -> Result<Vec<String>, LoadError> {
        let mut locations = self.loader.job_locations().await?;
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    pub fn statuses(&self) -> &'static [StatusDefinition] {
        &STATUS_CATALOG
    }
}
