use crate::model::CompletedTaskRecord;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub today: usize,
    pub week: usize,
    pub total: usize,
}

/// Counts completions for today, for the current Sunday-based week, and
/// overall. Calendar comparisons happen in `now`'s UTC offset; a record whose
/// timestamp does not parse still counts toward `total`.
pub fn compute_stats(records: &[CompletedTaskRecord], now: OffsetDateTime) -> Stats {
    let offset = now.offset();
    let today = now.date();
    let week_start = start_of_week(now);

    let mut stats = Stats {
        total: records.len(),
        ..Stats::default()
    };

    for record in records {
        let Ok(completed_at) = OffsetDateTime::parse(&record.completed_at, &Rfc3339) else {
            continue;
        };
        let local = completed_at.to_offset(offset);

        if local.date() == today {
            stats.today += 1;
        }
        if local >= week_start {
            stats.week += 1;
        }
    }

    stats
}

/// Midnight of the most recent Sunday on or before `now`.
pub fn start_of_week(now: OffsetDateTime) -> OffsetDateTime {
    let days_back = i64::from(now.weekday().number_days_from_sunday());
    (now.date() - Duration::days(days_back))
        .midnight()
        .assume_offset(now.offset())
}
