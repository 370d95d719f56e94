use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Project, Task};
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_NOTE: &str = "Focus";
pub const INTERRUPTED_NOTE: &str = "Interrupted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Pomodoro,
    Habit,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pomodoro => "pomodoro",
            Self::Habit => "habit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pomodoro" => Some(Self::Pomodoro),
            "habit" => Some(Self::Habit),
            _ => None,
        }
    }
}

/// A single timer run or habit completion
///
/// System times record when the timer actually ran and are never edited;
/// the `user_*` times are what the user corrected them to and drive all
/// statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub user_start_time: DateTime<Utc>,
    pub user_end_time: Option<DateTime<Utc>>,
    pub note: String,
    pub is_completed: bool,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub user_id: Option<String>,
    pub task_id: String,
}

impl Action {
    /// Open timer run starting now
    pub fn start(user_id: &str, task_id: &str, note: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: super::new_id(),
            start_time: now,
            end_time: None,
            user_start_time: now,
            user_end_time: None,
            note: note.unwrap_or_else(|| DEFAULT_NOTE.to_string()),
            is_completed: false,
            kind: ActionKind::Pomodoro,
            user_id: Some(user_id.to_string()),
            task_id: task_id.to_string(),
        }
    }

    /// Habit completion: zero-length and completed immediately
    pub fn habit(user_id: &str, task_id: &str, note: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            end_time: Some(now),
            user_end_time: Some(now),
            is_completed: true,
            kind: ActionKind::Habit,
            note: note.unwrap_or_default(),
            ..Self::start(user_id, task_id, None, now)
        }
    }

    /// Stop the timer. A user-edited end time is kept.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.end_time = Some(now);
        if self.user_end_time.is_none() {
            self.user_end_time = Some(now);
        }
        self.is_completed = true;
    }

    /// Milliseconds between the user times; 0 while the action is open
    pub fn duration_ms(&self) -> i64 {
        match self.user_end_time {
            Some(end) => (end - self.user_start_time).num_milliseconds().max(0),
            None => 0,
        }
    }

    /// Apply a user edit of times and note
    pub fn apply(&mut self, edit: ActionEdit) -> ApiResult<()> {
        let start = edit.user_start_time.unwrap_or(self.user_start_time);
        let end = edit.user_end_time.or(self.user_end_time);
        if let Some(end) = end {
            if end < start {
                return Err(ApiError::validation("End time cannot be before start time"));
            }
        }
        if self.kind == ActionKind::Habit && edit.user_start_time.is_some() {
            // habit completions stay zero-length
            self.user_start_time = start;
            self.user_end_time = Some(start);
        } else {
            self.user_start_time = start;
            self.user_end_time = end;
        }
        if let Some(note) = edit.note {
            self.note = note;
        }
        Ok(())
    }
}

/// Body of `PUT /api/timer/actions/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEdit {
    pub user_start_time: Option<DateTime<Utc>>,
    pub user_end_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// An action joined with its task and the task's project
///
/// Both references are optional: a task may have no project, and a
/// dangling task reference resolves to `None` instead of failing the query.
#[derive(Debug, Clone)]
pub struct ResolvedAction {
    pub action: Action,
    pub task: Option<Task>,
    pub project: Option<Project>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_duration_open_action_is_zero() {
        let action = Action::start("u1", "t1", None, Utc::now());
        assert_eq!(action.duration_ms(), 0);
        assert_eq!(action.note, DEFAULT_NOTE);
    }

    #[test]
    fn test_finish_keeps_user_end() {
        let start = Utc::now() - Duration::minutes(50);
        let mut action = Action::start("u1", "t1", None, start);
        let edited_end = start + Duration::minutes(25);
        action.user_end_time = Some(edited_end);

        action.finish(start + Duration::minutes(50));
        assert!(action.is_completed);
        assert_eq!(action.user_end_time, Some(edited_end));
        assert_eq!(action.duration_ms(), 25 * 60 * 1000);
    }

    #[test]
    fn test_habit_is_zero_length_and_completed() {
        let now = Utc::now();
        let action = Action::habit("u1", "t1", Some("done".into()), now);
        assert_eq!(action.kind, ActionKind::Habit);
        assert!(action.is_completed);
        assert_eq!(action.user_start_time, now);
        assert_eq!(action.user_end_time, Some(now));
        assert_eq!(action.duration_ms(), 0);
    }

    #[test]
    fn test_edit_rejects_end_before_start() {
        let now = Utc::now();
        let mut action = Action::start("u1", "t1", None, now);
        action.finish(now + Duration::minutes(25));

        let err = action
            .apply(ActionEdit {
                user_end_time: Some(now - Duration::minutes(1)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        action
            .apply(ActionEdit {
                user_start_time: Some(now - Duration::minutes(5)),
                note: Some("review".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(action.duration_ms(), 30 * 60 * 1000);
        assert_eq!(action.note, "review");
    }
}
