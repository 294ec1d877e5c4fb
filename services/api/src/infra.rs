use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use job_board::workflows::dashboard::{
    ApplicationId, ApplicationStatus, BoardSource, Category, CategoryId, Company, CompanyId,
    DashboardSnapshot, JobApplication, JobId, JobListing, Resume, ResumeId, SourceError,
    Subcategory, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Board backend held in memory, used when no remote API is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBoardStore {
    records: Arc<Mutex<DashboardSnapshot>>,
}

impl InMemoryBoardStore {
    pub(crate) fn new(snapshot: DashboardSnapshot) -> Self {
        Self {
            records: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub(crate) fn seeded() -> Self {
        Self::new(demo_snapshot())
    }

    pub(crate) fn applicants_count(&self, job: &JobId) -> Option<u32> {
        let guard = self.records.lock().expect("board store mutex poisoned");
        guard
            .jobs
            .iter()
            .find(|listing| &listing.id == job)
            .map(|listing| listing.applicants_count)
    }

    fn read<T>(&self, select: impl FnOnce(&DashboardSnapshot) -> T) -> T {
        let guard = self.records.lock().expect("board store mutex poisoned");
        select(&guard)
    }
}

#[async_trait]
impl BoardSource for InMemoryBoardStore {
    async fn applications_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<JobApplication>, SourceError> {
        Ok(self.read(|records| {
            records
                .applications
                .iter()
                .filter(|application| &application.user_id == user)
                .cloned()
                .collect()
        }))
    }

    async fn jobs_by_ids(&self, ids: &[JobId]) -> Result<Vec<JobListing>, SourceError> {
        Ok(self.read(|records| {
            records
                .jobs
                .iter()
                .filter(|listing| ids.contains(&listing.id))
                .cloned()
                .collect()
        }))
    }

    async fn companies_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, SourceError> {
        Ok(self.read(|records| {
            records
                .companies
                .iter()
                .filter(|company| ids.contains(&company.id))
                .cloned()
                .collect()
        }))
    }

    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, SourceError> {
        Ok(self.read(|records| {
            records
                .categories
                .iter()
                .filter(|category| ids.contains(&category.id))
                .cloned()
                .collect()
        }))
    }

    async fn resumes_by_ids(&self, ids: &[ResumeId]) -> Result<Vec<Resume>, SourceError> {
        Ok(self.read(|records| {
            records
                .resumes
                .iter()
                .filter(|resume| ids.contains(&resume.id))
                .cloned()
                .collect()
        }))
    }

    async fn job_locations(&self) -> Result<Vec<String>, SourceError> {
        let mut locations: Vec<String> = self.read(|records| {
            records
                .jobs
                .iter()
                .map(|listing| listing.location.clone())
                .collect()
        });
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), SourceError> {
        let mut guard = self.records.lock().expect("board store mutex poisoned");
        let position = guard
            .applications
            .iter()
            .position(|application| &application.id == id)
            .ok_or(SourceError::NotFound {
                resource: "applications",
            })?;

        let removed = guard.applications.remove(position);
        if let Some(listing) = guard
            .jobs
            .iter_mut()
            .find(|listing| listing.id == removed.job_id)
        {
            listing.applicants_count = listing.applicants_count.saturating_sub(1);
        }
        Ok(())
    }
}

fn timestamp(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn demo_application(
    id: &str,
    job: &str,
    status: ApplicationStatus,
    applied: (u32, u32),
) -> JobApplication {
    JobApplication {
        id: ApplicationId(id.to_string()),
        job_id: JobId(job.to_string()),
        user_id: UserId(DEMO_USER.to_string()),
        resume_id: ResumeId("resume-demo".to_string()),
        cover_letter: None,
        status,
        applied_at: timestamp(applied.0, applied.1),
        updated_at: timestamp(applied.0, applied.1),
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_listing(
    id: &str,
    title: &str,
    company: &str,
    category: &str,
    location: &str,
    employment_type: &str,
    salary: &str,
    skills: &[&str],
) -> JobListing {
    JobListing {
        id: JobId(id.to_string()),
        title: title.to_string(),
        company_id: CompanyId(company.to_string()),
        category_id: CategoryId(category.to_string()),
        subcategory_id: None,
        location: location.to_string(),
        employment_type: employment_type.to_string(),
        salary: Some(salary.to_string()),
        description: format!("{title} at {company}"),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        highlights: Vec::new(),
        qualifications: Vec::new(),
        openings: 1,
        applicants_count: 12,
        is_active: true,
        is_featured: false,
        posted_at: timestamp(2, 20),
        expires_at: None,
    }
}

fn demo_company(id: &str, name: &str, industry: &str) -> Company {
    Company {
        id: CompanyId(id.to_string()),
        name: name.to_string(),
        logo: None,
        website: Some(format!("https://{id}.example.com")),
        about: None,
        industry: Some(industry.to_string()),
        is_verified: true,
    }
}

pub(crate) const DEMO_USER: &str = "demo-seeker";

/// Seed data: five applications, one pointing at a removed job and one at a
/// company the store no longer knows about.
pub(crate) fn demo_snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        applications: vec![
            demo_application("app-1001", "job-rust", ApplicationStatus::Pending, (3, 2)),
            demo_application("app-1002", "job-data", ApplicationStatus::Shortlisted, (3, 9)),
            demo_application("app-1003", "job-support", ApplicationStatus::Rejected, (3, 15)),
            demo_application("app-1004", "job-sre", ApplicationStatus::Hired, (3, 21)),
            demo_application("app-1005", "job-archived", ApplicationStatus::Pending, (3, 25)),
        ],
        jobs: vec![
            demo_listing(
                "job-rust",
                "Rust Backend Engineer",
                "company-ferrous",
                "category-eng",
                "Remote",
                "FULL_TIME",
                "95,000",
                &["Rust", "PostgreSQL"],
            ),
            demo_listing(
                "job-data",
                "Data Engineer",
                "company-lumen",
                "category-eng",
                "Onsite",
                "FULL_TIME",
                "82000",
                &["Python", "SQL"],
            ),
            demo_listing(
                "job-support",
                "Customer Support Lead",
                "company-gone",
                "category-ops",
                "Hybrid",
                "PART_TIME",
                "Not disclosed",
                &["Communication"],
            ),
            demo_listing(
                "job-sre",
                "Site Reliability Engineer",
                "company-ferrous",
                "category-eng",
                "Remote",
                "CONTRACT",
                "110000",
                &["Kubernetes", "Rust"],
            ),
        ],
        companies: vec![
            demo_company("company-ferrous", "Ferrous Labs", "Software"),
            demo_company("company-lumen", "Lumen Analytics", "Data"),
        ],
        categories: vec![
            Category {
                id: CategoryId("category-eng".to_string()),
                name: "Engineering".to_string(),
                slug: "engineering".to_string(),
                subcategories: vec![Subcategory {
                    id: CategoryId("category-eng-backend".to_string()),
                    name: "Backend".to_string(),
                    slug: "backend".to_string(),
                }],
            },
            Category {
                id: CategoryId("category-ops".to_string()),
                name: "Operations".to_string(),
                slug: "operations".to_string(),
                subcategories: Vec::new(),
            },
        ],
        resumes: vec![Resume {
            id: ResumeId("resume-demo".to_string()),
            user_id: UserId(DEMO_USER.to_string()),
            resume_url: "https://uploads.example.com/resumes/demo.pdf".to_string(),
            education: vec!["BSc Computer Science".to_string()],
            experience: vec!["4 years backend development".to_string()],
            skills: vec!["Rust".to_string(), "SQL".to_string()],
        }],
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_decrements_applicant_count() {
        let store = InMemoryBoardStore::seeded();
        let job = JobId("job-rust".to_string());
        let before = store.applicants_count(&job).expect("job exists");

        store
            .delete_application(&ApplicationId("app-1001".to_string()))
            .await
            .expect("delete succeeds");

        assert_eq!(store.applicants_count(&job), Some(before - 1));
        let remaining = store
            .applications_for_user(&UserId(DEMO_USER.to_string()))
            .await
            .expect("applications");
        assert_eq!(remaining.len(), 4);
    }

    #[tokio::test]
    async fn delete_unknown_application_is_not_found() {
        let store = InMemoryBoardStore::seeded();
        let err = store
            .delete_application(&ApplicationId("app-missing".to_string()))
            .await
            .expect_err("unknown id");
        assert_eq!(
            err,
            SourceError::NotFound {
                resource: "applications"
            }
        );
    }

    #[tokio::test]
    async fn job_locations_are_distinct() {
        let store = InMemoryBoardStore::seeded();
        let locations = store.job_locations().await.expect("locations");
        assert_eq!(locations, vec!["Hybrid", "Onsite", "Remote"]);
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert!(parse_date("2025-03-01").is_ok());
        assert!(parse_date("March 1st")
            .unwrap_err()
            .contains("YYYY-MM-DD"));
    }
}
