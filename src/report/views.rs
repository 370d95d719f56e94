//! Built-in report views seeded at startup

use chrono::Utc;

use crate::domain::{new_id, ExportFormat, ReportView};

/// The read-only views every user sees
pub fn system_views() -> Vec<ReportView> {
    let now = Utc::now();
    let view = |name: &str,
                fields: &[&str],
                is_default: bool,
                use_24_hour: bool,
                description: &str| ReportView {
        id: new_id(),
        name: name.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        format: ExportFormat::Xlsx,
        is_default,
        is_system: true,
        use_24_hour,
        description: description.to_string(),
        user_id: None,
        created_at: now,
    };

    vec![
        view(
            "DaDuo",
            &["task", "date", "time", "duration", "description"],
            true,
            false,
            "Task and time summary (12-hour clock)",
        ),
        view(
            "Bike-GV",
            &["date", "description", "startTime", "endTime", "duration", "time"],
            false,
            true,
            "Detailed time log (24-hour HH:MM-HH:MM)",
        ),
    ]
}
