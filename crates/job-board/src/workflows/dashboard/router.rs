use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus, UserId};
use super::filter::FilterCriteria;
use super::loader::LoadError;
use super::pagination::PageRequest;
use super::service::DashboardService;
use super::session::WithdrawError;
use super::source::BoardSource;

/// Router builder exposing the job-seeker dashboard endpoints.
pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: BoardSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/dashboard/:user_id/applications",
            get(list_handler::<S>),
        )
        .route(
            "/api/v1/dashboard/:user_id/applications/:application_id",
            get(detail_handler::<S>).delete(withdraw_handler::<S>),
        )
        .route(
            "/api/v1/dashboard/:user_id/detail",
            delete(close_detail_handler::<S>),
        )
        .route(
            "/api/v1/dashboard/:user_id/filters",
            get(filter_options_handler::<S>),
        )
        .route("/api/v1/job-locations", get(job_locations_handler::<S>))
        .route("/api/v1/application-statuses", get(statuses_handler::<S>))
        .with_state(service)
}

/// Query string accepted by the list endpoint. Multi-select fields are comma lists.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub skills: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub refresh: bool,
}

impl ListQuery {
    pub fn criteria(&self) -> Result<FilterCriteria, String> {
        let statuses = split_list(self.status.as_deref())
            .into_iter()
            .map(|code| {
                ApplicationStatus::parse(&code).ok_or_else(|| format!("unknown status '{code}'"))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            statuses,
            locations: split_list(self.location.as_deref()),
            employment_types: split_list(self.employment_type.as_deref()),
            salary_min: non_blank(self.salary_min.as_deref()),
            salary_max: non_blank(self.salary_max.as_deref()),
            date_from: parse_optional_date(self.date_from.as_deref())?,
            date_to: parse_optional_date(self.date_to.as_deref())?,
            skills: split_list(self.skills.as_deref()),
        })
    }

    pub fn page_request(&self, default_per_page: usize) -> Option<PageRequest> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        Some(PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_per_page),
        ))
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    non_blank(raw)
        .map(|value| {
            NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .map_err(|err| format!("failed to parse '{value}' as YYYY-MM-DD ({err})"))
        })
        .transpose()
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: BoardSource + 'static,
{
    let criteria = match query.criteria() {
        Ok(criteria) => criteria,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };
    let page = query.page_request(service.page_size());

    match service
        .list(&UserId(user_id), &criteria, page, query.refresh)
        .await
    {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => load_error_response(&err),
    }
}

pub(crate) async fn detail_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: BoardSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.detail(&UserId(user_id), &id).await {
        Ok(Some(view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            &format!("application {id} is not on this dashboard"),
        ),
        Err(err) => load_error_response(&err),
    }
}

pub(crate) async fn withdraw_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: BoardSource + 'static,
{
    let id = ApplicationId(application_id);
    match service.withdraw(&UserId(user_id), &id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(WithdrawError::NotFound(_)) => error_response(
            StatusCode::NOT_FOUND,
            &format!("application {id} could not be found"),
        ),
        Err(WithdrawError::Load(err)) => load_error_response(&err),
        Err(err @ WithdrawError::Source(_)) => {
            error_response(StatusCode::BAD_GATEWAY, &err.to_string())
        }
    }
}

pub(crate) async fn close_detail_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(user_id): Path<String>,
) -> StatusCode
where
    S: BoardSource + 'static,
{
    service.close_detail(&UserId(user_id)).await;
    StatusCode::NO_CONTENT
}

pub(crate) async fn filter_options_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: BoardSource + 'static,
{
    match service.filter_options(&UserId(user_id)).await {
        Ok(options) => (StatusCode::OK, axum::Json(options)).into_response(),
        Err(err) => load_error_response(&err),
    }
}

pub(crate) async fn job_locations_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
) -> Response
where
    S: BoardSource + 'static,
{
    match service.job_locations().await {
        Ok(locations) => (StatusCode::OK, axum::Json(locations)).into_response(),
        Err(err) => load_error_response(&err),
    }
}

pub(crate) async fn statuses_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
) -> Response
where
    S: BoardSource + 'static,
{
    (StatusCode::OK, axum::Json(service.statuses())).into_response()
}

fn load_error_response(err: &LoadError) -> Response {
    error_response(StatusCode::BAD_GATEWAY, err.user_message())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}
