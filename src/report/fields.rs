//! Field registry and row mapping for report exports

use std::fmt;

use chrono::{DateTime, Utc};

use super::timefmt::{format_date, format_time_24, time_range_12, time_range_24, to_local};
use crate::domain::ResolvedAction;

pub const NO_PROJECT: &str = "No project";
pub const NO_TASK: &str = "No task";

/// A column that can appear in an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    Date,
    Project,
    Task,
    Description,
    StartTime,
    EndTime,
    Duration,
    Hours,
    Amount,
    Time,
}

impl ReportField {
    pub const ALL: [ReportField; 10] = [
        Self::Date,
        Self::Project,
        Self::Task,
        Self::Description,
        Self::StartTime,
        Self::EndTime,
        Self::Duration,
        Self::Hours,
        Self::Amount,
        Self::Time,
    ];

    /// Used when a request names no recognizable field
    pub const DEFAULT: [ReportField; 5] = [
        Self::Date,
        Self::Project,
        Self::Task,
        Self::Description,
        Self::Duration,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Project => "project",
            Self::Task => "task",
            Self::Description => "description",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::Duration => "duration",
            Self::Hours => "hours",
            Self::Amount => "amount",
            Self::Time => "time",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id.trim())
    }

    pub fn header(&self, use_24_hour: bool) -> &'static str {
        match self {
            Self::Date => "Date (YYYY-MM-DD)",
            Self::Project => "Project",
            Self::Task => "Task",
            Self::Description => "Description",
            Self::StartTime => "Start Time (HH:MM)",
            Self::EndTime => "End Time (HH:MM)",
            Self::Duration => "Duration (minutes)",
            Self::Hours => "Hours",
            Self::Amount => "Amount",
            Self::Time if use_24_hour => "Time (HH:MM-HH:MM)",
            Self::Time => "Time (HH:MMam – HH:MMpm)",
        }
    }

    /// Spreadsheet column width, in characters
    pub fn column_width(&self) -> f64 {
        match self {
            Self::Description => 30.0,
            Self::Time => 25.0,
            Self::Project | Self::Task | Self::StartTime | Self::EndTime => 20.0,
            Self::Date | Self::Duration | Self::Hours | Self::Amount => 15.0,
        }
    }
}

/// Map requested identifiers to fields, keeping their order.
///
/// Unknown identifiers are dropped; if nothing survives the default
/// subset is used.
pub fn resolve_fields<S: AsRef<str>>(ids: &[S]) -> Vec<ReportField> {
    let fields: Vec<ReportField> = ids
        .iter()
        .filter_map(|id| ReportField::from_id(id.as_ref()))
        .collect();
    if fields.is_empty() {
        ReportField::DEFAULT.to_vec()
    } else {
        fields
    }
}

/// An action flattened with the names and billing data an export needs
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub note: String,
    pub project_name: Option<String>,
    pub task_name: Option<String>,
    pub is_billable: bool,
    pub hourly_rate: f64,
}

impl From<&ResolvedAction> for ExportRecord {
    fn from(resolved: &ResolvedAction) -> Self {
        let project = resolved.project.as_ref();
        Self {
            start: resolved.action.user_start_time,
            end: resolved.action.user_end_time,
            note: resolved.action.note.clone(),
            project_name: project.map(|p| p.name.clone()),
            task_name: resolved.task.as_ref().map(|t| t.name.clone()),
            is_billable: project.is_some_and(|p| p.is_billable),
            hourly_rate: project.map(|p| p.hourly_rate).unwrap_or(0.0),
        }
    }
}

/// A formatted cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// One export row: each requested field with its value, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub cells: Vec<(ReportField, CellValue)>,
}

impl ReportRow {
    pub fn get(&self, field: ReportField) -> Option<&CellValue> {
        self.cells.iter().find(|(f, _)| *f == field).map(|(_, v)| v)
    }
}

/// Turns export records into rows for a fixed field list
#[derive(Debug, Clone)]
pub struct FieldMapper {
    fields: Vec<ReportField>,
    use_24_hour: bool,
    /// Stand-in end time for actions still running
    now: DateTime<Utc>,
}

impl FieldMapper {
    pub fn new(fields: Vec<ReportField>, use_24_hour: bool, now: DateTime<Utc>) -> Self {
        let fields = if fields.is_empty() {
            ReportField::DEFAULT.to_vec()
        } else {
            fields
        };
        Self {
            fields,
            use_24_hour,
            now,
        }
    }

    pub fn fields(&self) -> &[ReportField] {
        &self.fields
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.header(self.use_24_hour)).collect()
    }

    pub fn map(&self, record: &ExportRecord) -> ReportRow {
        let cells = self
            .fields
            .iter()
            .map(|field| (*field, self.value(*field, record)))
            .collect();
        ReportRow { cells }
    }

    pub fn rows(&self, records: &[ExportRecord]) -> Vec<ReportRow> {
        records.iter().map(|r| self.map(r)).collect()
    }

    fn value(&self, field: ReportField, record: &ExportRecord) -> CellValue {
        let end = record.end.unwrap_or(self.now);
        let minutes = duration_minutes(record.start, end);
        let text = CellValue::Text;

        match field {
            ReportField::Date => text(format_date(to_local(record.start))),
            ReportField::Project => text(
                record
                    .project_name
                    .clone()
                    .unwrap_or_else(|| NO_PROJECT.to_string()),
            ),
            ReportField::Task => text(
                record
                    .task_name
                    .clone()
                    .unwrap_or_else(|| NO_TASK.to_string()),
            ),
            ReportField::Description => text(record.note.clone()),
            ReportField::StartTime => text(format_time_24(to_local(record.start))),
            ReportField::EndTime => text(format_time_24(to_local(end))),
            ReportField::Duration => CellValue::Integer(minutes),
            ReportField::Hours => text(format!("{:.2}", minutes as f64 / 60.0)),
            ReportField::Amount => {
                let rate = if record.is_billable { record.hourly_rate } else { 0.0 };
                text(format!("{:.2}", rate * minutes as f64 / 60.0))
            }
            ReportField::Time => {
                let (start, end) = (to_local(record.start), to_local(end));
                if self.use_24_hour {
                    text(time_range_24(start, end))
                } else {
                    text(time_range_12(start, end))
                }
            }
        }
    }
}

/// Whole minutes between two instants, rounded half away from zero
fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ((end - start).num_milliseconds() as f64 / 60_000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(minutes: i64, billable: bool, rate: f64) -> ExportRecord {
        let start = Utc::now() - Duration::hours(3);
        ExportRecord {
            start,
            end: Some(start + Duration::minutes(minutes)),
            note: "Review".into(),
            project_name: Some("Client".into()),
            task_name: Some("Docs".into()),
            is_billable: billable,
            hourly_rate: rate,
        }
    }

    #[test]
    fn test_unknown_fields_fall_back_to_default() {
        assert_eq!(resolve_fields::<&str>(&[]), ReportField::DEFAULT.to_vec());
        assert_eq!(
            resolve_fields(&["bogus", "nope"]),
            ReportField::DEFAULT.to_vec()
        );
        assert_eq!(
            resolve_fields(&["hours", "bogus", "date"]),
            vec![ReportField::Hours, ReportField::Date]
        );
    }

    #[test]
    fn test_row_preserves_requested_order() {
        let mapper = FieldMapper::new(
            resolve_fields(&["amount", "task", "duration", "hours"]),
            false,
            Utc::now(),
        );
        let row = mapper.map(&record(90, true, 100.0));
        let values: Vec<String> = row.cells.iter().map(|(_, v)| v.to_string()).collect();
        assert_eq!(values, vec!["150.00", "Docs", "90", "1.50"]);
        assert_eq!(row.get(ReportField::Duration), Some(&CellValue::Integer(90)));
    }

    #[test]
    fn test_non_billable_amount_is_zero() {
        let mapper = FieldMapper::new(vec![ReportField::Amount], false, Utc::now());
        let row = mapper.map(&record(60, false, 100.0));
        assert_eq!(row.cells[0].1, CellValue::Text("0.00".into()));
    }

    #[test]
    fn test_missing_names_use_fallbacks() {
        let mut rec = record(30, false, 0.0);
        rec.project_name = None;
        rec.task_name = None;
        rec.note = String::new();
        let mapper = FieldMapper::new(ReportField::DEFAULT.to_vec(), false, Utc::now());
        let row = mapper.map(&rec);
        assert_eq!(row.get(ReportField::Project).unwrap().to_string(), NO_PROJECT);
        assert_eq!(row.get(ReportField::Task).unwrap().to_string(), NO_TASK);
        assert_eq!(row.get(ReportField::Description).unwrap().to_string(), "");
    }

    #[test]
    fn test_open_action_ends_now() {
        let now = Utc::now();
        let mut rec = record(0, true, 60.0);
        rec.start = now - Duration::minutes(20);
        rec.end = None;
        let mapper = FieldMapper::new(vec![ReportField::Duration], true, now);
        assert_eq!(mapper.map(&rec).cells[0].1, CellValue::Integer(20));
    }

    #[test]
    fn test_time_header_follows_toggle() {
        assert_eq!(ReportField::Time.header(true), "Time (HH:MM-HH:MM)");
        assert_eq!(ReportField::Time.header(false), "Time (HH:MMam – HH:MMpm)");
        let mapper = FieldMapper::new(vec![ReportField::Time], true, Utc::now());
        let value = mapper.map(&record(30, false, 0.0)).cells[0].1.to_string();
        assert_eq!(value.len(), "HH:MM-HH:MM".len());
    }
}
