use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::combiner::combine;
use super::domain::{ApplicationId, JobApplicationView, UserId};
use super::filter::{FilterCriteria, FilterEngine, FilterOptions};
use super::loader::{DashboardLoader, LoadError};
use super::pagination::{paginate, Page, PageRequest};
use super::source::{BoardSource, SourceError};

/// Mutable dashboard state for one job seeker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub views: Vec<JobApplicationView>,
    pub selected: Option<ApplicationId>,
    /// When the views were last rebuilt from the backend.
    pub loaded_at: Option<Instant>,
    pub last_error: Option<String>,
}

impl DashboardState {
    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }
}

/// One user's view set. Refresh and withdraw hold the same lock, so a withdraw
/// never races a reload of the views it edits.
///
/// Views older than `view_ttl` are rebuilt before they are read again; a zero
/// TTL reloads on every read.
pub struct DashboardSession<S> {
    user: UserId,
    loader: Arc<DashboardLoader<S>>,
    engine: FilterEngine,
    view_ttl: Duration,
    state: Mutex<DashboardState>,
}

impl<S> DashboardSession<S>
where
    S: BoardSource + 'static,
{
    pub fn new(
        user: UserId,
        loader: Arc<DashboardLoader<S>>,
        engine: FilterEngine,
        view_ttl: Duration,
    ) -> Self {
        Self {
            user,
            loader,
            engine,
            view_ttl,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Reloads every entity and rebuilds the combined views.
    pub async fn refresh(&self) -> Result<usize, LoadError> {
        let mut state = self.state.lock().await;
        self.reload(&mut state).await
    }

    async fn reload(&self, state: &mut DashboardState) -> Result<usize, LoadError> {
        match self.loader.load(&self.user).await {
            Ok(snapshot) => {
                let views = combine(&snapshot);
                let dropped = snapshot.applications.len() - views.len();
                if dropped > 0 {
                    warn!(user = %self.user, dropped, "applications reference unknown jobs");
                }

                if let Some(selected) = &state.selected {
                    if !views.iter().any(|view| view.id() == selected) {
                        state.selected = None;
                    }
                }
                state.views = views;
                state.loaded_at = Some(Instant::now());
                state.last_error = None;
                Ok(state.views.len())
            }
            Err(err) => {
                state.last_error = Some(err.user_message().to_string());
                Err(err)
            }
        }
    }

    async fn ensure_loaded(&self) -> Result<tokio::sync::MutexGuard<'_, DashboardState>, LoadError> {
        let mut state = self.state.lock().await;
        if self.is_stale(&state) {
            self.reload(&mut state).await?;
        }
        Ok(state)
    }

    fn is_stale(&self, state: &DashboardState) -> bool {
        state
            .loaded_at
            .map_or(true, |loaded_at| loaded_at.elapsed() >= self.view_ttl)
    }

    /// Filters and paginates the current views, reloading them once stale.
    pub async fn list(
        &self,
        criteria: &FilterCriteria,
        page: PageRequest,
    ) -> Result<Page<JobApplicationView>, LoadError> {
        let state = self.ensure_loaded().await?;
        let filtered = self.engine.apply(&state.views, criteria);
        Ok(paginate(filtered, page))
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, LoadError> {
        let state = self.ensure_loaded().await?;
        Ok(FilterOptions::from_views(&state.views))
    }

    /// Opens the detail view for an application.
    pub async fn select(&self, id: &ApplicationId) -> Result<Option<JobApplicationView>, LoadError> {
        let mut state = self.ensure_loaded().await?;
        let view = state.views.iter().find(|view| view.id() == id).cloned();
        if view.is_some() {
            state.selected = Some(id.clone());
        }
        Ok(view)
    }

    pub async fn close_detail(&self) {
        self.state.lock().await.selected = None;
    }

    /// Deletes the application upstream, then drops it from the local views.
    ///
    /// Nothing changes locally unless the backend confirms the delete. An
    /// application the backend no longer knows counts as withdrawn.
    pub async fn withdraw(&self, id: &ApplicationId) -> Result<JobApplicationView, WithdrawError> {
        let mut state = self.ensure_loaded().await?;
        let Some(position) = state.views.iter().position(|view| view.id() == id) else {
            return Err(WithdrawError::NotFound(id.clone()));
        };

        let policy = self.loader.policy();
        let source = self.loader.source();
        match policy
            .timed("applications", source.delete_application(id))
            .await
        {
            Ok(()) => {}
            Err(SourceError::NotFound { .. }) => {
                info!(user = %self.user, application = %id, "application already gone upstream");
            }
            Err(err) => {
                warn!(user = %self.user, application = %id, error = %err, "withdraw failed");
                return Err(WithdrawError::Source(err));
            }
        }

        let removed = state.views.remove(position);
        if state.selected.as_ref() == Some(id) {
            state.selected = None;
        }
        info!(user = %self.user, application = %id, "application withdrawn");
        Ok(removed)
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }
}

/// Error raised when an application cannot be withdrawn.
#[derive(Debug, thiserror::Error)]
pub enum WithdrawError {
    #[error("application {0} is not on this dashboard")]
    NotFound(ApplicationId),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("could not withdraw the application: {0}")]
    Source(SourceError),
}
