//! Job-seeker dashboard: fetch, combine, filter, paginate, and withdraw.
//!
//! The combiner and filter engine are pure functions over plain data; all I/O
//! goes through [`BoardSource`] and the [`FetchPolicy`] timeout/retry wrapper.

pub mod catalog;
pub mod combiner;
pub mod domain;
pub mod export;
pub mod filter;
pub mod http;
pub mod loader;
pub mod pagination;
pub mod retry;
pub mod router;
pub mod service;
pub mod session;
pub mod source;

#[cfg(test)]
mod tests;

pub use catalog::{status_definition, STATUS_CATALOG};
pub use combiner::{combine, DashboardSnapshot};
pub use domain::{
    ApplicationId, ApplicationStatus, Category, CategoryId, Company, CompanyId, JobApplication,
    JobApplicationView, JobId, JobListing, Resume, ResumeId, StatusDefinition, Subcategory,
    UserId,
};
pub use export::write_csv;
pub use filter::{FilterCriteria, FilterEngine, FilterOptions, SalaryPolicy};
pub use http::HttpBoardSource;
pub use loader::{DashboardLoader, LoadError};
pub use pagination::{paginate, Page, PageRequest};
pub use retry::{FetchPolicy, RetryExhausted};
pub use router::dashboard_router;
pub use service::DashboardService;
pub use session::{DashboardSession, DashboardState, WithdrawError};
pub use source::{BoardSource, SourceError};
