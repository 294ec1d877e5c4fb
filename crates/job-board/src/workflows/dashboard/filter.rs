use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{parse_amount, ApplicationStatus, JobApplicationView};

/// How listings without a numeric salary behave while a salary bound is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPolicy {
    Include,
    #[default]
    Exclude,
}

impl SalaryPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "include" => Some(Self::Include),
            "exclude" => Some(Self::Exclude),
            _ => None,
        }
    }
}

/// Active predicate values. Empty sets and unset bounds match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub search: String,
    pub statuses: BTreeSet<ApplicationStatus>,
    pub locations: BTreeSet<String>,
    pub employment_types: BTreeSet<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub skills: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn salary_bounds(&self) -> (Option<f64>, Option<f64>) {
        (
            self.salary_min.as_deref().and_then(parse_amount),
            self.salary_max.as_deref().and_then(parse_amount),
        )
    }
}

/// Applies [`FilterCriteria`] to combined views: AND across fields, OR within a set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    salary_policy: SalaryPolicy,
}

impl FilterEngine {
    pub fn new(salary_policy: SalaryPolicy) -> Self {
        Self { salary_policy }
    }

    pub fn salary_policy(&self) -> SalaryPolicy {
        self.salary_policy
    }

    pub fn apply(
        &self,
        views: &[JobApplicationView],
        criteria: &FilterCriteria,
    ) -> Vec<JobApplicationView> {
        views
            .iter()
            .filter(|view| self.matches(view, criteria))
            .cloned()
            .collect()
    }

    pub fn matches(&self, view: &JobApplicationView, criteria: &FilterCriteria) -> bool {
        matches_search(view, &criteria.search)
            && member_or_empty(&criteria.statuses, &view.application.status)
            && member_or_empty(&criteria.locations, &view.job.location)
            && member_or_empty(&criteria.employment_types, &view.job.employment_type)
            && self.matches_salary(view, criteria)
            && matches_dates(view, criteria.date_from, criteria.date_to)
            && matches_skills(view, &criteria.skills)
    }

    fn matches_salary(&self, view: &JobApplicationView, criteria: &FilterCriteria) -> bool {
        let (min, max) = criteria.salary_bounds();
        if min.is_none() && max.is_none() {
            return true;
        }

        match view.job.salary_amount() {
            Some(amount) => {
                min.map_or(true, |min| amount >= min) && max.map_or(true, |max| amount <= max)
            }
            None => self.salary_policy == SalaryPolicy::Include,
        }
    }
}

fn matches_search(view: &JobApplicationView, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    view.job.title.to_lowercase().contains(&needle)
        || view
            .company_name()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
}

fn member_or_empty<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

fn matches_dates(view: &JobApplicationView, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let applied_on = view.application.applied_at.date_naive();
    from.map_or(true, |from| applied_on >= from) && to.map_or(true, |to| applied_on <= to)
}

fn matches_skills(view: &JobApplicationView, skills: &BTreeSet<String>) -> bool {
    skills.is_empty() || view.job.skills.iter().any(|skill| skills.contains(skill))
}

/// Distinct values present in a view set, for populating filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub statuses: Vec<ApplicationStatus>,
    pub locations: Vec<String>,
    pub employment_types: Vec<String>,
    pub skills: Vec<String>,
}

impl FilterOptions {
    pub fn from_views(views: &[JobApplicationView]) -> Self {
        let mut statuses = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut employment_types = BTreeSet::new();
        let mut skills = BTreeSet::new();

        for view in views {
            statuses.insert(view.application.status);
            locations.insert(view.job.location.clone());
            employment_types.insert(view.job.employment_type.clone());
            skills.extend(view.job.skills.iter().cloned());
        }

        Self {
            statuses: statuses.into_iter().collect(),
            locations: locations.into_iter().collect(),
            employment_types: employment_types.into_iter().collect(),
            skills: skills.into_iter().collect(),
        }
    }
}
