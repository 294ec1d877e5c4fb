use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::domain::{
    ApplicationId, Category, CategoryId, Company, CompanyId, JobApplication, JobId, JobListing,
    Resume, ResumeId, UserId,
};
use super::source::{BoardSource, SourceError};

/// [`BoardSource`] backed by the job-board REST API.
#[derive(Debug, Clone)]
pub struct HttpBoardSource {
    client: Client,
    base_url: Url,
}

impl HttpBoardSource {
    /// The base URL is treated as a directory, so `http://host/api` and
    /// `http://host/api/` resolve endpoints identically.
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized).map_err(|err| SourceError::Transport {
            resource: "base url",
            message: err.to_string(),
        })?;

        let client = Client::builder()
            .build()
            .map_err(|err| transport_error("client", err))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, resource: &'static str, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|err| SourceError::Transport {
                resource,
                message: err.to_string(),
            })
    }

    // The id is pushed as one escaped segment so it cannot add path, query or
    // fragment parts.
    fn application_url(&self, id: &ApplicationId) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::Transport {
                resource: "applications",
                message: format!("{} cannot be a base url", self.base_url),
            })?
            .pop_if_empty()
            .push("applications")
            .push(&id.0);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut url = self.endpoint(resource, path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        debug!(resource, %url, "fetching");
        let response = self
            .client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|err| transport_error(resource, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(resource, status));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| SourceError::Decode {
                resource,
                message: err.to_string(),
            })
    }

    async fn get_batch<T: DeserializeOwned, I: std::fmt::Display>(
        &self,
        resource: &'static str,
        key: &str,
        ids: &[I],
    ) -> Result<Vec<T>, SourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.get_json(resource, resource, &[(key, joined)]).await
    }
}

#[async_trait]
impl BoardSource for HttpBoardSource {
    async fn applications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<JobApplication>, SourceError> {
        self.get_json("applications", "applications", &[("userId", user.0.clone())])
            .await
    }

    async fn jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobListing>, SourceError> {
        self.get_batch("jobs", "jobIds", ids).await
    }

    async fn companies_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, SourceError> {
        self.get_batch("companies", "ids", ids).await
    }

    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, SourceError> {
        self.get_batch("categories", "ids", ids).await
    }

    async fn resumes_by_ids(&self, ids: &[ResumeId]) -> Result<Vec<Resume>, SourceError> {
        self.get_batch("resumes", "ids", ids).await
    }

    async fn job_locations(&self) -> Result<Vec<String>, SourceError> {
        self.get_json("job-locations", "job-locations", &[]).await
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), SourceError> {
        let url = self.application_url(id)?;

        debug!(%url, "deleting application");
        let response = self
            .client
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(|err| transport_error("applications", err))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error("applications", status))
        }
    }
}

fn status_error(resource: &'static str, status: StatusCode) -> SourceError {
    if status == StatusCode::NOT_FOUND {
        SourceError::NotFound { resource }
    } else {
        SourceError::Status {
            resource,
            status: status.as_u16(),
        }
    }
}

fn transport_error(resource: &'static str, err: reqwest::Error) -> SourceError {
    SourceError::Transport {
        resource,
        message: err.to_string(),
    }
}
