use super::domain::{ApplicationStatus, StatusDefinition};

/// Compiled-in status catalog used for labels, colors, and filter options.
pub const STATUS_CATALOG: [StatusDefinition; 4] = [
    StatusDefinition {
        id: ApplicationStatus::Pending,
        name: "Pending",
        color: "#f59e0b",
    },
    StatusDefinition {
        id: ApplicationStatus::Shortlisted,
        name: "Shortlisted",
        color: "#3b82f6",
    },
    StatusDefinition {
        id: ApplicationStatus::Rejected,
        name: "Rejected",
        color: "#ef4444",
    },
    StatusDefinition {
        id: ApplicationStatus::Hired,
        name: "Hired",
        color: "#10b981",
    },
];

pub const fn status_definition(status: ApplicationStatus) -> StatusDefinition {
    match status {
        ApplicationStatus::Pending => STATUS_CATALOG[0],
        ApplicationStatus::Shortlisted => STATUS_CATALOG[1],
        ApplicationStatus::Rejected => STATUS_CATALOG[2],
        ApplicationStatus::Hired => STATUS_CATALOG[3],
    }
}
