use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::common::*;
use crate::workflows::dashboard::domain::{ApplicationStatus, JobApplicationView};
use crate::workflows::dashboard::filter::{
    FilterCriteria, FilterEngine, FilterOptions, SalaryPolicy,
};

fn v1() -> JobApplicationView {
    view("v1", ApplicationStatus::Pending, "Remote", Some("50000"), 3)
}

fn v2() -> JobApplicationView {
    view("v2", ApplicationStatus::Hired, "Onsite", Some("80000"), 10)
}

fn undisclosed() -> JobApplicationView {
    view(
        "v3",
        ApplicationStatus::Shortlisted,
        "Hybrid",
        Some("Not disclosed"),
        20,
    )
}

fn engine() -> FilterEngine {
    FilterEngine::new(SalaryPolicy::Exclude)
}

fn set<T: Ord>(items: impl IntoIterator<Item = T>) -> BTreeSet<T> {
    items.into_iter().collect()
}

#[test]
fn status_filter_selects_matching_views() {
    let criteria = FilterCriteria {
        statuses: set([ApplicationStatus::Pending]),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&[v1(), v2()], &criteria), vec![v1()]);
}

#[test]
fn salary_minimum_excludes_lower_salaries() {
    let criteria = FilterCriteria {
        salary_min: Some("60000".to_string()),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&[v1(), v2()], &criteria), vec![v2()]);
}

#[test]
fn unmatched_search_returns_nothing() {
    let criteria = FilterCriteria {
        search: "no-match-string".to_string(),
        ..FilterCriteria::default()
    };
    assert!(engine().apply(&[v1(), v2()], &criteria).is_empty());
}

#[test]
fn search_matches_title_or_company_case_insensitively() {
    let views = [v1(), v2()];

    let by_title = FilterCriteria {
        search: "ENGINEER V2".to_string(),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &by_title), vec![v2()]);

    let by_company = FilterCriteria {
        search: "  acme ".to_string(),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &by_company).len(), 2);
}

#[test]
fn search_skips_views_without_company() {
    let mut orphan = v1();
    orphan.company = None;
    let criteria = FilterCriteria {
        search: "acme".to_string(),
        ..FilterCriteria::default()
    };
    assert!(engine().apply(&[orphan], &criteria).is_empty());
}

#[test]
fn categories_combine_with_and() {
    let views = [v1(), v2(), undisclosed()];
    let combined = FilterCriteria {
        statuses: set([ApplicationStatus::Pending, ApplicationStatus::Hired]),
        locations: set(["Onsite".to_string()]),
        ..FilterCriteria::default()
    };
    let status_only = FilterCriteria {
        statuses: combined.statuses.clone(),
        ..FilterCriteria::default()
    };
    let location_only = FilterCriteria {
        locations: combined.locations.clone(),
        ..FilterCriteria::default()
    };

    let sequential = engine().apply(&engine().apply(&views, &status_only), &location_only);
    assert_eq!(engine().apply(&views, &combined), sequential);
    assert_eq!(sequential, vec![v2()]);
}

#[test]
fn empty_sets_match_everything_in_order() {
    let views = vec![v2(), undisclosed(), v1()];
    let criteria = FilterCriteria {
        statuses: BTreeSet::new(),
        locations: BTreeSet::new(),
        employment_types: BTreeSet::new(),
        skills: BTreeSet::new(),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &criteria), views);
}

#[test]
fn reset_restores_match_all_and_is_idempotent() {
    let views = vec![v1(), v2(), undisclosed()];
    let mut criteria = FilterCriteria {
        search: "engineer".to_string(),
        statuses: set([ApplicationStatus::Hired]),
        salary_max: Some("10".to_string()),
        date_from: NaiveDate::from_ymd_opt(2025, 3, 15),
        ..FilterCriteria::default()
    };

    criteria.reset();
    assert!(criteria.is_empty());
    let first = engine().apply(&views, &criteria);
    criteria.reset();
    let second = engine().apply(&views, &criteria);

    assert_eq!(first, views);
    assert_eq!(second, views);
}

#[test]
fn undisclosed_salary_follows_policy() {
    let views = [v1(), v2(), undisclosed()];
    let criteria = FilterCriteria {
        salary_min: Some("40,000".to_string()),
        salary_max: Some("$90,000".to_string()),
        ..FilterCriteria::default()
    };

    let excluded = FilterEngine::new(SalaryPolicy::Exclude).apply(&views, &criteria);
    assert_eq!(excluded, vec![v1(), v2()]);

    let included = FilterEngine::new(SalaryPolicy::Include).apply(&views, &criteria);
    assert_eq!(included, vec![v1(), v2(), undisclosed()]);
}

#[test]
fn undisclosed_salary_passes_when_no_bound_is_set() {
    let views = [undisclosed()];
    let criteria = FilterCriteria {
        salary_min: Some("   ".to_string()),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &criteria), vec![undisclosed()]);
}

#[test]
fn salary_bounds_are_inclusive() {
    let criteria = FilterCriteria {
        salary_min: Some("50000".to_string()),
        salary_max: Some("80000".to_string()),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&[v1(), v2()], &criteria), vec![v1(), v2()]);
}

#[test]
fn date_range_is_inclusive_on_applied_day() {
    let views = [v1(), v2(), undisclosed()];
    let criteria = FilterCriteria {
        date_from: NaiveDate::from_ymd_opt(2025, 3, 3),
        date_to: NaiveDate::from_ymd_opt(2025, 3, 10),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &criteria), vec![v1(), v2()]);

    let open_ended = FilterCriteria {
        date_from: NaiveDate::from_ymd_opt(2025, 3, 11),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &open_ended), vec![undisclosed()]);
}

#[test]
fn skills_match_on_any_overlap() {
    let mut python = v2();
    python.job.skills = vec!["Python".to_string(), "Airflow".to_string()];
    let views = [v1(), python.clone()];

    let criteria = FilterCriteria {
        skills: set(["Airflow".to_string(), "Go".to_string()]),
        ..FilterCriteria::default()
    };
    assert_eq!(engine().apply(&views, &criteria), vec![python]);
}

#[test]
fn employment_type_filter_uses_job_field() {
    let mut contract = v2();
    contract.job.employment_type = "CONTRACT".to_string();
    let criteria = FilterCriteria {
        employment_types: set(["CONTRACT".to_string()]),
        ..FilterCriteria::default()
    };
    assert_eq!(
        engine().apply(&[v1(), contract.clone()], &criteria),
        vec![contract]
    );
}

#[test]
fn options_list_distinct_sorted_values() {
    let mut contract = v2();
    contract.job.employment_type = "CONTRACT".to_string();
    contract.job.skills = vec!["SQL".to_string(), "Rust".to_string()];

    let options = FilterOptions::from_views(&[v1(), contract, v1()]);

    assert_eq!(
        options.statuses,
        vec![ApplicationStatus::Pending, ApplicationStatus::Hired]
    );
    assert_eq!(options.locations, vec!["Onsite", "Remote"]);
    assert_eq!(options.employment_types, vec!["CONTRACT", "FULL_TIME"]);
    assert_eq!(options.skills, vec!["Rust", "SQL"]);
}

#[test]
fn salary_policy_parses_config_values() {
    assert_eq!(SalaryPolicy::parse("INCLUDE"), Some(SalaryPolicy::Include));
    assert_eq!(SalaryPolicy::parse(" exclude "), Some(SalaryPolicy::Exclude));
    assert_eq!(SalaryPolicy::parse("maybe"), None);
    assert_eq!(SalaryPolicy::default(), SalaryPolicy::Exclude);
}
