use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// A client or area of work that tasks are grouped under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub is_billable: bool,
    pub hourly_rate: f64,
    /// Monthly budget cap; 0 means unset
    pub monthly_budget_limit: f64,
    /// Owner. `None` only for rows created before ownership existed.
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Billable amount for the given number of hours
    pub fn amount_for_hours(&self, hours: f64) -> f64 {
        if self.is_billable {
            hours * self.hourly_rate
        } else {
            0.0
        }
    }

    /// Overwrite the editable fields from validated input
    pub fn apply(&mut self, input: ProjectInput, now: DateTime<Utc>) -> ApiResult<()> {
        let (name, is_billable, hourly_rate, budget) = input.validate()?;
        self.name = name;
        self.is_billable = is_billable;
        self.hourly_rate = hourly_rate;
        self.monthly_budget_limit = budget;
        self.updated_at = now;
        Ok(())
    }
}

/// Body of project create/update requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: Option<String>,
    #[serde(default)]
    pub is_billable: bool,
    pub hourly_rate: Option<f64>,
    pub monthly_budget_limit: Option<f64>,
}

impl ProjectInput {
    /// Build a new project owned by `user_id`
    pub fn into_project(self, user_id: &str, now: DateTime<Utc>) -> ApiResult<Project> {
        let mut project = Project {
            id: super::new_id(),
            name: String::new(),
            is_billable: false,
            hourly_rate: 0.0,
            monthly_budget_limit: 0.0,
            user_id: Some(user_id.to_string()),
            created_at: now,
            updated_at: now,
        };
        project.apply(self, now)?;
        Ok(project)
    }

    /// Returns (name, is_billable, hourly_rate, monthly_budget_limit).
    ///
    /// Rate and budget are zeroed for non-billable projects.
    fn validate(self) -> ApiResult<(String, bool, f64, f64)> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ApiError::validation("Project name is required"));
        }

        if !self.is_billable {
            return Ok((name.to_string(), false, 0.0, 0.0));
        }

        let rate = match self.hourly_rate {
            Some(rate) if rate.is_finite() && rate >= 0.0 => rate,
            _ => {
                return Err(ApiError::validation(
                    "Billable projects need a valid hourly rate",
                ));
            }
        };

        let budget = match self.monthly_budget_limit {
            Some(b) if b.is_finite() && b < 0.0 => {
                return Err(ApiError::validation("Monthly budget cannot be negative"));
            }
            Some(b) if b.is_finite() => b,
            _ => 0.0,
        };

        Ok((name.to_string(), true, rate, budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, billable: bool, rate: Option<f64>) -> ProjectInput {
        ProjectInput {
            name: Some(name.to_string()),
            is_billable: billable,
            hourly_rate: rate,
            monthly_budget_limit: Some(500.0),
        }
    }

    #[test]
    fn test_non_billable_project_zeroes_rate() {
        let project = input("Internal", false, Some(80.0))
            .into_project("u1", Utc::now())
            .unwrap();
        assert!(!project.is_billable);
        assert_eq!(project.hourly_rate, 0.0);
        assert_eq!(project.monthly_budget_limit, 0.0);
        assert_eq!(project.amount_for_hours(2.0), 0.0);
    }

    #[test]
    fn test_billable_project_requires_rate() {
        let err = input("Client", true, None)
            .into_project("u1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = input("Client", true, Some(-5.0))
            .into_project("u1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let project = input("Client", true, Some(100.0))
            .into_project("u1", Utc::now())
            .unwrap();
        assert_eq!(project.amount_for_hours(1.5), 150.0);
        assert_eq!(project.monthly_budget_limit, 500.0);
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = input("   ", false, None)
            .into_project("u1", Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Project name is required");
    }
}
