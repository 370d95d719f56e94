use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Output file format for report exports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
        }
    }
}

/// Saved export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub name: String,
    /// Ordered field identifiers, see `report::ReportField`
    pub fields: Vec<String>,
    pub format: ExportFormat,
    pub is_default: bool,
    /// Seeded views cannot be edited or deleted
    pub is_system: bool,
    #[serde(rename = "use24Hour")]
    pub use_24_hour: bool,
    pub description: String,
    /// `None` for system views
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/reports/views`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportViewInput {
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, rename = "use24Hour")]
    pub use_24_hour: bool,
    pub description: Option<String>,
}

impl ReportViewInput {
    pub fn into_view(self, user_id: &str, now: DateTime<Utc>) -> ApiResult<ReportView> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let fields: Vec<String> = self
            .fields
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if name.is_empty() || fields.is_empty() {
            return Err(ApiError::validation("View name and fields are required"));
        }

        let format = match self.format.as_deref() {
            None | Some("") => ExportFormat::Xlsx,
            Some(f) => ExportFormat::parse(f)
                .ok_or_else(|| ApiError::validation(format!("Unsupported format: {}", f)))?,
        };

        Ok(ReportView {
            id: super::new_id(),
            name: name.to_string(),
            fields,
            format,
            is_default: self.is_default,
            is_system: false,
            use_24_hour: self.use_24_hour,
            description: self.description.unwrap_or_default(),
            user_id: Some(user_id.to_string()),
            created_at: now,
        })
    }
}
