//! Habit streak tracking
//!
//! A streak counts consecutive local days with at least one completion,
//! walking back from today.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::domain::HabitStats;

/// Compute habit stats from the local dates of a task's completions.
///
/// `longest_streak` only ever grows: it is the larger of the current
/// streak and the previously stored value, so deleting history never
/// lowers it.
pub fn compute_habit_stats(
    completion_dates: &[NaiveDate],
    today: NaiveDate,
    previous: &HabitStats,
) -> HabitStats {
    let today_completed_count = completion_dates.iter().filter(|d| **d == today).count() as u32;
    let active: HashSet<NaiveDate> = completion_dates.iter().copied().collect();

    let mut current_streak = 0;
    let mut day = today;
    while active.contains(&day) {
        current_streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    HabitStats {
        current_streak,
        longest_streak: current_streak.max(previous.longest_streak),
        today_completed_count,
    }
}

/// Whether today's completions reached the daily goal
pub fn goal_reached(stats: &HabitStats, daily_goal: Option<u32>) -> bool {
    daily_goal.is_some_and(|goal| stats.today_completed_count >= goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(n)).unwrap()
    }

    #[test]
    fn test_streak_stops_at_gap() {
        let dates = vec![today(), today(), days_ago(1), days_ago(2), days_ago(4)];
        let stats = compute_habit_stats(&dates, today(), &HabitStats::default());
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.today_completed_count, 2);
    }

    #[test]
    fn test_no_completion_today_means_no_streak() {
        let dates = vec![days_ago(1), days_ago(2), days_ago(3)];
        let stats = compute_habit_stats(&dates, today(), &HabitStats::default());
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.today_completed_count, 0);
    }

    #[test]
    fn test_longest_streak_is_a_ratchet() {
        let previous = HabitStats {
            current_streak: 7,
            longest_streak: 7,
            today_completed_count: 1,
        };
        let stats = compute_habit_stats(&[], today(), &previous);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 7);
        assert_eq!(stats.today_completed_count, 0);
    }

    #[test]
    fn test_goal_reached() {
        let stats = HabitStats {
            today_completed_count: 10,
            ..Default::default()
        };
        assert!(goal_reached(&stats, Some(10)));
        assert!(!goal_reached(&stats, Some(11)));
        assert!(!goal_reached(&stats, None));
    }
}
