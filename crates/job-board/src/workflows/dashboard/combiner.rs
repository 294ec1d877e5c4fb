use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::catalog::status_definition;
use super::domain::{Category, Company, JobApplication, JobApplicationView, JobListing, Resume};

/// Raw entity arrays gathered by one dashboard load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub applications: Vec<JobApplication>,
    pub jobs: Vec<JobListing>,
    pub companies: Vec<Company>,
    pub categories: Vec<Category>,
    pub resumes: Vec<Resume>,
}

/// Joins each application with its job, company, category, resume, and status.
///
/// Applications whose job cannot be resolved are dropped. Missing companies,
/// categories, or resumes leave the nested field empty. Output follows the
/// input application order.
pub fn combine(snapshot: &DashboardSnapshot) -> Vec<JobApplicationView> {
    let jobs = index_by(&snapshot.jobs, |job| &job.id);
    let companies = index_by(&snapshot.companies, |company| &company.id);
    let categories = index_by(&snapshot.categories, |category| &category.id);
    let resumes = index_by(&snapshot.resumes, |resume| &resume.id);

    snapshot
        .applications
        .iter()
        .filter_map(|application| {
            let job = *jobs.get(&application.job_id)?;
            Some(JobApplicationView {
                application: application.clone(),
                job: job.clone(),
                company: companies.get(&job.company_id).map(|c| (*c).clone()),
                category: categories.get(&job.category_id).map(|c| (*c).clone()),
                resume: resumes.get(&application.resume_id).map(|r| (*r).clone()),
                status: status_definition(application.status),
            })
        })
        .collect()
}

// First occurrence wins when the backend repeats an id.
fn index_by<'a, T, K, F>(items: &'a [T], key: F) -> HashMap<&'a K, &'a T>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> &'a K,
{
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        index.entry(key(item)).or_insert(item);
    }
    index
}
