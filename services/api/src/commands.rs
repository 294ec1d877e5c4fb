use crate::infra::{InMemoryBoardStore, DEMO_USER};
use chrono::NaiveDate;
use clap::Args;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::workflows::dashboard::{
    write_csv, ApplicationId, ApplicationStatus, BoardSource, DashboardService, FetchPolicy,
    FilterCriteria, FilterEngine, HttpBoardSource, JobApplicationView, Page, PageRequest, UserId,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Filter flags shared by the dashboard commands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct FilterArgs {
    /// Case-insensitive text matched against job title and company name
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Status codes to include (PENDING, SHORTLISTED, REJECTED, HIRED)
    #[arg(long = "status", value_delimiter = ',', value_parser = parse_status)]
    pub(crate) statuses: Vec<ApplicationStatus>,
    /// Job locations to include
    #[arg(long = "location", value_delimiter = ',')]
    pub(crate) locations: Vec<String>,
    /// Employment types to include
    #[arg(long = "employment-type", value_delimiter = ',')]
    pub(crate) employment_types: Vec<String>,
    /// Skills; a job matches when it lists any of them
    #[arg(long = "skill", value_delimiter = ',')]
    pub(crate) skills: Vec<String>,
    #[arg(long)]
    pub(crate) salary_min: Option<String>,
    #[arg(long)]
    pub(crate) salary_max: Option<String>,
    /// Earliest application date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date_from: Option<NaiveDate>,
    /// Latest application date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date_to: Option<NaiveDate>,
}

impl FilterArgs {
    pub(crate) fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            statuses: self.statuses.iter().copied().collect(),
            locations: self.locations.iter().cloned().collect::<BTreeSet<_>>(),
            employment_types: self.employment_types.iter().cloned().collect(),
            salary_min: self.salary_min.clone(),
            salary_max: self.salary_max.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            skills: self.skills.iter().cloned().collect(),
        }
    }
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(raw).ok_or_else(|| format!("unknown status '{raw}'"))
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Job seeker whose applications are listed
    #[arg(long)]
    pub(crate) user: String,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// Page size (defaults to JOBBOARD_PAGE_SIZE)
    #[arg(long)]
    pub(crate) per_page: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Job seeker whose applications are exported
    #[arg(long)]
    pub(crate) user: String,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Destination file; stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Application to withdraw during the demo
    #[arg(long, default_value = "app-1002")]
    pub(crate) withdraw: String,
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    match config.board.base_url.clone() {
        Some(base_url) => {
            let source = Arc::new(HttpBoardSource::new(&base_url)?);
            list_with(&DashboardService::from_config(source, &config), args).await
        }
        None => {
            let source = Arc::new(InMemoryBoardStore::seeded());
            list_with(&DashboardService::from_config(source, &config), args).await
        }
    }
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    match config.board.base_url.clone() {
        Some(base_url) => {
            let source = Arc::new(HttpBoardSource::new(&base_url)?);
            export_with(&DashboardService::from_config(source, &config), args).await
        }
        None => {
            let source = Arc::new(InMemoryBoardStore::seeded());
            export_with(&DashboardService::from_config(source, &config), args).await
        }
    }
}

async fn list_with<S>(service: &DashboardService<S>, args: ListArgs) -> Result<(), AppError>
where
    S: BoardSource + 'static,
{
    let page = PageRequest::new(args.page, args.per_page.unwrap_or(service.page_size()));
    let page = service
        .list(&UserId(args.user.clone()), &args.filters.criteria(), Some(page), false)
        .await?;
    render_page(&args.user, &page);
    Ok(())
}

async fn export_with<S>(service: &DashboardService<S>, args: ExportArgs) -> Result<(), AppError>
where
    S: BoardSource + 'static,
{
    let user = UserId(args.user);
    let criteria = args.filters.criteria();
    let mut views = Vec::new();
    let mut request = PageRequest::new(1, usize::MAX);
    loop {
        let page = service.list(&user, &criteria, Some(request), false).await?;
        let last = page.page >= page.total_pages;
        views.extend(page.items);
        if last {
            break;
        }
        request = PageRequest::new(page.page + 1, page.per_page);
    }

    match args.output {
        Some(path) => write_csv(&views, File::create(path)?)?,
        None => write_csv(&views, io::stdout().lock())?,
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = InMemoryBoardStore::seeded();
    let service = DashboardService::new(
        Arc::new(store.clone()),
        FetchPolicy::default(),
        FilterEngine::default(),
        10,
    );
    let user = UserId(DEMO_USER.to_string());

    println!("Job board dashboard demo");
    let page = service
        .list(&user, &FilterCriteria::default(), None, true)
        .await?;
    render_page(&user.0, &page);

    let options = service.filter_options(&user).await?;
    println!(
        "\nFilter options: {} locations | {} employment types | {} skills",
        options.locations.len(),
        options.employment_types.len(),
        options.skills.len()
    );

    let remote_rust = FilterCriteria {
        locations: BTreeSet::from(["Remote".to_string()]),
        skills: BTreeSet::from(["Rust".to_string()]),
        ..FilterCriteria::default()
    };
    let filtered = service.list(&user, &remote_rust, None, false).await?;
    println!("\nRemote roles needing Rust:");
    render_rows(&filtered.items);

    let target = ApplicationId(args.withdraw);
    let job = service
        .detail(&user, &target)
        .await?
        .map(|view| view.job.id);
    match service.withdraw(&user, &target).await {
        Ok(removed) => {
            println!("\nWithdrew {} ({})", removed.application.id, removed.job.title);
            if let Some(count) = job.and_then(|job| store.applicants_count(&job)) {
                println!("- applicants remaining on listing: {count}");
            }
        }
        Err(err) => println!("\nWithdraw failed: {err}"),
    }

    let page = service
        .list(&user, &FilterCriteria::default(), None, false)
        .await?;
    render_page(&user.0, &page);
    Ok(())
}

fn render_page(user: &str, page: &Page<JobApplicationView>) {
    println!(
        "\nApplications for {user} (page {} of {}, {} total)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    );
    render_rows(&page.items);
}

fn render_rows(views: &[JobApplicationView]) {
    if views.is_empty() {
        println!("  (no applications)");
        return;
    }
    for view in views {
        println!("{}", format_row(view));
    }
}

fn format_row(view: &JobApplicationView) -> String {
    format!(
        "  - {} | {} @ {} | {} | {} | {} | applied {}",
        view.application.id,
        view.job.title,
        view.company_name().unwrap_or("unknown company"),
        view.job.location,
        view.job.salary.as_deref().unwrap_or("not disclosed"),
        view.status.name,
        view.application.applied_at.format("%Y-%m-%d"),
    )
}
