use std::io::Write;

use super::domain::JobApplicationView;

const HEADER: [&str; 10] = [
    "application_id",
    "job_title",
    "company",
    "category",
    "location",
    "employment_type",
    "salary",
    "status",
    "applied_at",
    "resume_url",
];

/// Writes one CSV row per view; missing nested records become empty cells.
pub fn write_csv<W: Write>(views: &[JobApplicationView], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for view in views {
        let applied_at = view.application.applied_at.to_rfc3339();
        writer.write_record([
            view.application.id.0.as_str(),
            view.job.title.as_str(),
            view.company_name().unwrap_or_default(),
            view.category
                .as_ref()
                .map(|category| category.name.as_str())
                .unwrap_or_default(),
            view.job.location.as_str(),
            view.job.employment_type.as_str(),
            view.job.salary.as_deref().unwrap_or_default(),
            view.status.name,
            applied_at.as_str(),
            view.resume
                .as_ref()
                .map(|resume| resume.resume_url.as_str())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
