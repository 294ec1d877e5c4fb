use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::dashboard::catalog::status_definition;
use crate::workflows::dashboard::combiner::DashboardSnapshot;
use crate::workflows::dashboard::domain::{
    ApplicationId, ApplicationStatus, Category, CategoryId, Company, CompanyId, JobApplication,
    JobApplicationView, JobId, JobListing, Resume, ResumeId, UserId,
};
use crate::workflows::dashboard::filter::{FilterEngine, SalaryPolicy};
use crate::workflows::dashboard::retry::FetchPolicy;
use crate::workflows::dashboard::service::DashboardService;
use crate::workflows::dashboard::source::{BoardSource, SourceError};

pub(super) fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn user() -> UserId {
    UserId("user-1".to_string())
}

pub(super) fn application(
    id: &str,
    job: &str,
    resume: &str,
    status: ApplicationStatus,
    day: u32,
) -> JobApplication {
    JobApplication {
        id: ApplicationId(id.to_string()),
        job_id: JobId(job.to_string()),
        user_id: user(),
        resume_id: ResumeId(resume.to_string()),
        cover_letter: None,
        status,
        applied_at: at(day),
        updated_at: at(day),
    }
}

pub(super) fn job(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    employment_type: &str,
    salary: Option<&str>,
    skills: &[&str],
) -> JobListing {
    JobListing {
        id: JobId(id.to_string()),
        title: title.to_string(),
        company_id: CompanyId(company.to_string()),
        category_id: CategoryId("engineering".to_string()),
        subcategory_id: None,
        location: location.to_string(),
        employment_type: employment_type.to_string(),
        salary: salary.map(str::to_string),
        description: String::new(),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        highlights: Vec::new(),
        qualifications: Vec::new(),
        openings: 1,
        applicants_count: 5,
        is_active: true,
        is_featured: false,
        posted_at: at(1),
        expires_at: None,
    }
}

pub(super) fn company(id: &str, name: &str) -> Company {
    Company {
        id: CompanyId(id.to_string()),
        name: name.to_string(),
        logo: None,
        website: None,
        about: None,
        industry: Some("Software".to_string()),
        is_verified: true,
    }
}

pub(super) fn category() -> Category {
    Category {
        id: CategoryId("engineering".to_string()),
        name: "Engineering".to_string(),
        slug: "engineering".to_string(),
        subcategories: Vec::new(),
    }
}

pub(super) fn resume(id: &str) -> Resume {
    Resume {
        id: ResumeId(id.to_string()),
        user_id: user(),
        resume_url: format!("https://cdn.example.com/resumes/{id}.pdf"),
        education: Vec::new(),
        experience: Vec::new(),
        skills: vec!["Rust".to_string()],
    }
}

/// Three applications over two companies; `app-3` points at a job that is gone.
pub(super) fn snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        applications: vec![
            application("app-1", "job-1", "resume-1", ApplicationStatus::Pending, 3),
            application("app-2", "job-2", "resume-missing", ApplicationStatus::Hired, 10),
            application("app-3", "job-gone", "resume-1", ApplicationStatus::Rejected, 12),
        ],
        jobs: vec![
            job(
                "job-2",
                "Data Engineer",
                "company-2",
                "Onsite",
                "CONTRACT",
                Some("80000"),
                &["Python", "SQL"],
            ),
            job(
                "job-1",
                "Rust Developer",
                "company-1",
                "Remote",
                "FULL_TIME",
                Some("50,000"),
                &["Rust", "SQL"],
            ),
        ],
        companies: vec![company("company-1", "Ferrous Systems")],
        categories: vec![category()],
        resumes: vec![resume("resume-1")],
    }
}

/// Builds a view directly, without going through the combiner.
pub(super) fn view(
    id: &str,
    status: ApplicationStatus,
    location: &str,
    salary: Option<&str>,
    day: u32,
) -> JobApplicationView {
    let application = application(id, &format!("job-{id}"), "resume-1", status, day);
    JobApplicationView {
        job: job(
            &format!("job-{id}"),
            &format!("Engineer {id}"),
            "company-1",
            location,
            "FULL_TIME",
            salary,
            &["Rust"],
        ),
        company: Some(company("company-1", "Acme Corp")),
        category: Some(category()),
        resume: Some(resume("resume-1")),
        status: status_definition(status),
        application,
    }
}

pub(super) fn quick_policy() -> FetchPolicy {
    FetchPolicy {
        timeout: Duration::from_millis(200),
        max_retries: 3,
        retry_delay: Duration::from_millis(1),
    }
}

/// In-memory board with failure injection and call counting.
#[derive(Default)]
pub(super) struct MemorySource {
    pub(super) data: Mutex<DashboardSnapshot>,
    pub(super) locations: Vec<String>,
    pub(super) application_calls: AtomicU32,
    pub(super) failing_loads: AtomicU32,
    pub(super) failing_resources: Mutex<HashSet<&'static str>>,
    pub(super) fail_deletes: Mutex<bool>,
    pub(super) deleted: Mutex<Vec<ApplicationId>>,
}

impl MemorySource {
    pub(super) fn with_snapshot(snapshot: DashboardSnapshot) -> Self {
        Self {
            data: Mutex::new(snapshot),
            locations: vec![
                "Remote".to_string(),
                "Onsite".to_string(),
                "Remote".to_string(),
            ],
            ..Self::default()
        }
    }

    /// The next `count` application fetches fail with a 503.
    pub(super) fn fail_next_loads(&self, count: u32) {
        self.failing_loads.store(count, Ordering::SeqCst);
    }

    pub(super) fn fail_resource(&self, resource: &'static str) {
        self.failing_resources
            .lock()
            .expect("lock")
            .insert(resource);
    }

    pub(super) fn fail_deletes(&self) {
        *self.fail_deletes.lock().expect("lock") = true;
    }

    pub(super) fn application_calls(&self) -> u32 {
        self.application_calls.load(Ordering::SeqCst)
    }

    fn check(&self, resource: &'static str) -> Result<(), SourceError> {
        if self
            .failing_resources
            .lock()
            .expect("lock")
            .contains(resource)
        {
            return Err(SourceError::Transport {
                resource,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BoardSource for MemorySource {
    async fn applications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<JobApplication>, SourceError> {
        self.application_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(SourceError::Status {
                resource: "applications",
                status: 503,
            });
        }
        self.check("applications")?;
        let data = self.data.lock().expect("lock");
        Ok(data
            .applications
            .iter()
            .filter(|app| &app.user_id == user)
            .cloned()
            .collect())
    }

    async fn jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobListing>, SourceError> {
        self.check("jobs")?;
        let data = self.data.lock().expect("lock");
        Ok(data
            .jobs
            .iter()
            .filter(|job| ids.contains(&job.id))
            .cloned()
            .collect())
    }

    async fn companies_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, SourceError> {
        self.check("companies")?;
        let data = self.data.lock().expect("lock");
        Ok(data
            .companies
            .iter()
            .filter(|company| ids.contains(&company.id))
            .cloned()
            .collect())
    }

    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, SourceError> {
        self.check("categories")?;
        let data = self.data.lock().expect("lock");
        Ok(data
            .categories
            .iter()
            .filter(|category| ids.contains(&category.id))
            .cloned()
            .collect())
    }

    async fn resumes_by_ids(&self, ids: &[ResumeId]) -> Result<Vec<Resume>, SourceError> {
        self.check("resumes")?;
        let data = self.data.lock().expect("lock");
        Ok(data
            .resumes
            .iter()
            .filter(|resume| ids.contains(&resume.id))
            .cloned()
            .collect())
    }

    async fn job_locations(&self) -> Result<Vec<String>, SourceError> {
        self.check("job-locations")?;
        Ok(self.locations.clone())
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), SourceError> {
        if *self.fail_deletes.lock().expect("lock") {
            return Err(SourceError::Status {
                resource: "applications",
                status: 500,
            });
        }
        let mut data = self.data.lock().expect("lock");
        let before = data.applications.len();
        data.applications.retain(|app| &app.id != id);
        if data.applications.len() == before {
            return Err(SourceError::NotFound {
                resource: "applications",
            });
        }
        self.deleted.lock().expect("lock").push(id.clone());
        Ok(())
    }
}

pub(super) fn build_service() -> (DashboardService<MemorySource>, Arc<MemorySource>) {
    let source = Arc::new(MemorySource::with_snapshot(snapshot()));
    let service = DashboardService::new(
        source.clone(),
        quick_policy(),
        FilterEngine::new(SalaryPolicy::Exclude),
        10,
    );
    (service, source)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
