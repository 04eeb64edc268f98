use chrono::{DateTime, Duration, Utc};

use crate::models::AssignmentPatch;

/// How far ahead of the due date a new assignment reminds by default.
pub const DEFAULT_LEAD: Duration = Duration::days(3);

/// How far a snooze pushes the reminder.
pub const SNOOZE_STEP: Duration = Duration::hours(1);

/// Default reminder for a due date: exactly three days earlier.
///
/// Not clamped against the current time, so a due date less than three days
/// away yields a reminder that is already due.
pub fn derive_default_reminder(due_at: DateTime<Utc>) -> DateTime<Utc> {
    due_at - DEFAULT_LEAD
}

/// Reminder stored on creation. An explicit value, or an explicit null to opt
/// out, wins over the default.
pub fn resolve_initial_reminder(
    requested: Option<Option<DateTime<Utc>>>,
    due_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match requested {
        Some(explicit) => explicit,
        None => Some(derive_default_reminder(due_at)),
    }
}

/// Clears the reminder when a patch moves the status into the terminal set
/// and the caller did not say anything about `remind_at`.
pub fn apply_status_transition(mut patch: AssignmentPatch) -> AssignmentPatch {
    let finishing = patch.status.is_some_and(|s| s.is_terminal());
    if finishing && patch.remind_at.is_none() {
        patch.remind_at = Some(None);
    }
    patch
}

pub fn snooze(current: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    current.unwrap_or(now) + SNOOZE_STEP
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::AssignmentStatus;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_default_reminder_is_three_days_before() {
        let due = at(2026, 4, 15, 23, 59);
        let remind = derive_default_reminder(due);
        assert_eq!(remind, at(2026, 4, 12, 23, 59));
        assert_eq!((due - remind).num_seconds(), 259_200);
    }

    #[test]
    fn test_default_reminder_may_be_in_the_past() {
        let due = at(2020, 1, 1, 0, 0);
        assert_eq!(derive_default_reminder(due), at(2019, 12, 29, 0, 0));
    }

    #[test]
    fn test_initial_reminder_honours_explicit_values() {
        let due = at(2026, 4, 15, 23, 59);
        let custom = at(2026, 4, 14, 9, 0);

        assert_eq!(resolve_initial_reminder(None, due), Some(at(2026, 4, 12, 23, 59)));
        assert_eq!(resolve_initial_reminder(Some(Some(custom)), due), Some(custom));
        assert_eq!(resolve_initial_reminder(Some(None), due), None);
    }

    #[test]
    fn test_terminal_status_clears_reminder() {
        for status in [AssignmentStatus::Submitted, AssignmentStatus::Completed] {
            let patch = AssignmentPatch {
                status: Some(status),
                ..Default::default()
            };
            assert_eq!(apply_status_transition(patch).remind_at, Some(None));
        }
    }

    #[test]
    fn test_explicit_reminder_survives_terminal_status() {
        let keep = at(2026, 5, 1, 8, 0);
        let patch = AssignmentPatch {
            status: Some(AssignmentStatus::Completed),
            remind_at: Some(Some(keep)),
            ..Default::default()
        };
        assert_eq!(apply_status_transition(patch).remind_at, Some(Some(keep)));
    }

    #[test]
    fn test_non_terminal_status_leaves_reminder_untouched() {
        for status in [AssignmentStatus::Pending, AssignmentStatus::Late] {
            let patch = AssignmentPatch {
                status: Some(status),
                ..Default::default()
            };
            assert_eq!(apply_status_transition(patch).remind_at, None);
        }

        let title_only = AssignmentPatch {
            title: Some("HW2".into()),
            ..Default::default()
        };
        assert_eq!(apply_status_transition(title_only).remind_at, None);
    }

    #[test]
    fn test_snooze_from_existing_or_now() {
        let now = at(2026, 3, 1, 12, 0);
        let current = at(2026, 3, 1, 9, 30);
        assert_eq!(snooze(Some(current), now), at(2026, 3, 1, 10, 30));
        assert_eq!(snooze(None, now), at(2026, 3, 1, 13, 0));
    }
}
