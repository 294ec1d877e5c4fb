use std::sync::Arc;

use tracing::{debug, info};

use super::combiner::DashboardSnapshot;
use super::domain::UserId;
use super::retry::{FetchPolicy, RetryExhausted};
use super::source::{unique_ids, BoardSource, SourceError};

/// Fetch orchestration for one dashboard load.
///
/// Applications come first, then the jobs they reference, then companies,
/// categories, and resumes concurrently. Any failed fetch fails the whole
/// load, which is then retried from the start.
pub struct DashboardLoader<S> {
    source: Arc<S>,
    policy: FetchPolicy,
}

impl<S> DashboardLoader<S>
where
    S: BoardSource + 'static,
{
    pub fn new(source: Arc<S>, policy: FetchPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    pub async fn load(&self, user: &UserId) -> Result<DashboardSnapshot, LoadError> {
        let snapshot = self
            .policy
            .retry("dashboard load", || self.load_once(user))
            .await
            .map_err(LoadError::from)?;

        info!(
            %user,
            applications = snapshot.applications.len(),
            jobs = snapshot.jobs.len(),
            "dashboard data loaded"
        );
        Ok(snapshot)
    }

    pub async fn job_locations(&self) -> Result<Vec<String>, LoadError> {
        self.policy
            .retry("job locations", || {
                self.policy
                    .timed("job-locations", self.source.job_locations())
            })
            .await
            .map_err(LoadError::from)
    }

    async fn load_once(&self, user: &UserId) -> Result<DashboardSnapshot, SourceError> {
        let source = &self.source;
        let policy = &self.policy;

        let applications = policy
            .timed("applications", source.applications_for_user(user))
            .await?;

        let job_ids = unique_ids(applications.iter().map(|app| &app.job_id));
        let jobs = policy
            .timed("jobs", source.jobs_by_ids(&job_ids))
            .await?;

        let company_ids = unique_ids(jobs.iter().map(|job| &job.company_id));
        let category_ids = unique_ids(jobs.iter().map(|job| &job.category_id));
        let resume_ids = unique_ids(applications.iter().map(|app| &app.resume_id));
        debug!(
            companies = company_ids.len(),
            categories = category_ids.len(),
            resumes = resume_ids.len(),
            "fetching related records"
        );

        let (companies, categories, resumes) = tokio::try_join!(
            policy.timed("companies", source.companies_by_ids(&company_ids)),
            policy.timed("categories", source.categories_by_ids(&category_ids)),
            policy.timed("resumes", source.resumes_by_ids(&resume_ids)),
        )?;

        Ok(DashboardSnapshot {
            applications,
            jobs,
            companies,
            categories,
            resumes,
        })
    }
}

/// Load failure carrying a message safe to show to the job seeker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
    pub attempts: u32,
    #[source]
    pub source: SourceError,
}

impl LoadError {
    pub fn user_message(&self) -> &str {
        &self.message
    }
}

impl From<RetryExhausted> for LoadError {
    fn from(value: RetryExhausted) -> Self {
        let message = match &value.source {
            SourceError::Timeout { .. } => format!(
                "The job board took too long to respond while loading {}. Please try again.",
                value.source.resource()
            ),
            SourceError::Decode { .. } => format!(
                "The job board sent {} data we could not read. Please try again later.",
                value.source.resource()
            ),
            _ => format!(
                "We couldn't load {} right now. Please try again.",
                value.source.resource()
            ),
        };

        Self {
            message,
            attempts: value.attempts,
            source: value.source,
        }
    }
}
