use async_trait::async_trait;

use super::domain::{
    ApplicationId, Category, CategoryId, Company, CompanyId, JobApplication, JobId, JobListing,
    Resume, ResumeId, UserId,
};

/// Read and withdraw operations against the job-board backend.
///
/// Batch lookups receive de-duplicated ids; implementations may return the
/// records in any order and silently omit ids they do not know.
#[async_trait]
pub trait BoardSource: Send + Sync {
    async fn applications_for_user(&self, user: &UserId)
        -> Result<Vec<JobApplication>, SourceError>;
    async fn jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobListing>, SourceError>;
    async fn companies_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, SourceError>;
    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, SourceError>;
    async fn resumes_by_ids(&self, ids: &[ResumeId]) -> Result<Vec<Resume>, SourceError>;
    async fn job_locations(&self) -> Result<Vec<String>, SourceError>;
    /// Hard-deletes the application; the backend decrements the job's applicant count.
    async fn delete_application(&self, id: &ApplicationId) -> Result<(), SourceError>;
}

/// Error enumeration for backend fetch and mutation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("{resource} request timed out after {after_ms} ms")]
    Timeout { resource: &'static str, after_ms: u64 },
    #[error("{resource} request failed: {message}")]
    Transport {
        resource: &'static str,
        message: String,
    },
    #[error("{resource} request returned status {status}")]
    Status { resource: &'static str, status: u16 },
    #[error("{resource} response could not be decoded: {message}")]
    Decode {
        resource: &'static str,
        message: String,
    },
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
}

impl SourceError {
    /// Malformed payloads will not fix themselves on a second attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::Decode { .. })
    }

    pub fn resource(&self) -> &'static str {
        match self {
            SourceError::Timeout { resource, .. }
            | SourceError::Transport { resource, .. }
            | SourceError::Status { resource, .. }
            | SourceError::Decode { resource, .. }
            | SourceError::NotFound { resource } => resource,
        }
    }
}

/// Removes repeated ids while keeping first-seen order.
pub fn unique_ids<'a, I, T>(ids: I) -> Vec<T>
where
    I: IntoIterator<Item = &'a T>,
    T: Clone + Eq + std::hash::Hash + 'a,
{
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}
