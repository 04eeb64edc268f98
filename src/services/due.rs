//! Read-time classification of assignments relative to the current time.
//!
//! Nothing here is persisted: buckets and labels are recomputed on every read
//! over records the store already returned in `due_at` ascending order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Assignment;

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;
pub const MONTH_MS: i64 = 30 * DAY_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    #[serde(rename = "overdue")]
    Overdue,
    #[serde(rename = "due_today")]
    DueToday,
    #[serde(rename = "this_week")]
    ThisWeek,
    #[serde(rename = "next_30_days")]
    Next30Days,
    #[serde(rename = "later")]
    Later,
}

impl Bucket {
    /// Buckets rendered as labelled groups, in display order.
    pub const GROUPED: [Bucket; 4] = [
        Bucket::Overdue,
        Bucket::DueToday,
        Bucket::ThisWeek,
        Bucket::Next30Days,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Overdue => "Overdue",
            Bucket::DueToday => "Due Today",
            Bucket::ThisWeek => "This Week",
            Bucket::Next30Days => "Next 30 Days",
            Bucket::Later => "Later",
        }
    }
}

/// Milliseconds left until `due_at`; negative once overdue.
pub fn ms_until_due(due_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (due_at - now).num_milliseconds()
}

/// Bucket for an assignment, or `None` when its status is terminal.
pub fn bucket(assignment: &Assignment, now: DateTime<Utc>) -> Option<Bucket> {
    if assignment.status.is_terminal() {
        return None;
    }
    Some(bucket_for_ms(ms_until_due(assignment.due_at, now)))
}

fn bucket_for_ms(ms: i64) -> Bucket {
    if ms < 0 {
        Bucket::Overdue
    } else if ms < DAY_MS {
        Bucket::DueToday
    } else if ms < WEEK_MS {
        Bucket::ThisWeek
    } else if ms < MONTH_MS {
        Bucket::Next30Days
    } else {
        Bucket::Later
    }
}

/// Human label such as "3h left", "Due tomorrow" or "5 days left".
///
/// Rounds up, so 0.1 hours left reads "1h left". Exactly zero milliseconds
/// left is not overdue and reads "0h left".
pub fn format_due_label(due_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let ms = ms_until_due(due_at, now);
    if ms < 0 {
        return "Overdue".to_string();
    }
    let hours = ms as f64 / HOUR_MS as f64;
    if hours < 24.0 {
        return format!("{}h left", hours.ceil() as i64);
    }
    let days = (hours / 24.0).ceil() as i64;
    if days == 1 {
        "Due tomorrow".to_string()
    } else {
        format!("{} days left", days)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Group<T> {
    pub bucket: Bucket,
    pub label: &'static str,
    pub items: Vec<T>,
}

/// Active assignments split into labelled groups plus the overflow beyond 30 days.
#[derive(Debug, Clone, Serialize)]
pub struct Upcoming<T> {
    pub groups: Vec<Group<T>>,
    pub later: Vec<T>,
}

impl<T> Upcoming<T> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.later.is_empty()
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Upcoming<U> {
        Upcoming {
            groups: self
                .groups
                .into_iter()
                .map(|g| Group {
                    bucket: g.bucket,
                    label: g.label,
                    items: g.items.into_iter().map(&mut f).collect(),
                })
                .collect(),
            later: self.later.into_iter().map(&mut f).collect(),
        }
    }
}

/// Groups assignments by bucket, keeping the input order inside each bucket.
/// Terminal assignments are dropped and empty groups are omitted.
pub fn group_upcoming(assignments: Vec<Assignment>, now: DateTime<Utc>) -> Upcoming<Assignment> {
    let mut slots: [Vec<Assignment>; 4] = Default::default();
    let mut later = Vec::new();

    for assignment in assignments {
        match bucket(&assignment, now) {
            None => continue,
            Some(Bucket::Overdue) => slots[0].push(assignment),
            Some(Bucket::DueToday) => slots[1].push(assignment),
            Some(Bucket::ThisWeek) => slots[2].push(assignment),
            Some(Bucket::Next30Days) => slots[3].push(assignment),
            Some(Bucket::Later) => later.push(assignment),
        }
    }

    let groups = Bucket::GROUPED
        .into_iter()
        .zip(slots)
        .filter(|(_, items)| !items.is_empty())
        .map(|(bucket, items)| Group {
            bucket,
            label: bucket.label(),
            items,
        })
        .collect();

    Upcoming { groups, later }
}

/// Counts for the dashboard strip. The windows are cumulative: an item due
/// today also counts towards this week and this month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DueStats {
    pub due_today: usize,
    pub this_week: usize,
    pub this_month: usize,
}

pub fn due_stats(assignments: &[Assignment], now: DateTime<Utc>) -> DueStats {
    let mut stats = DueStats::default();
    for a in assignments.iter().filter(|a| !a.status.is_terminal()) {
        let ms = ms_until_due(a.due_at, now);
        if ms < 0 {
            continue;
        }
        if ms < DAY_MS {
            stats.due_today += 1;
        }
        if ms < WEEK_MS {
            stats.this_week += 1;
        }
        if ms < MONTH_MS {
            stats.this_month += 1;
        }
    }
    stats
}
