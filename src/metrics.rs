use chrono::{DateTime, Datelike, TimeDelta, TimeZone};

use crate::model::{Entry, Idea, StatusCount, StatusScheme, SummaryCounts};

/// Share of an idea's steps that are done, rounded half up. Zero with no steps.
pub fn idea_completion_percent(idea: &Idea) -> u8 {
    let total = idea.steps.len();
    if total == 0 {
        return 0;
    }
    let done = idea.done_count();
    ((done * 200 + total) / (total * 2)) as u8
}

/// Counts for the dashboard. Calendar comparisons use `now`'s time zone;
/// the week window is a rolling seven days, not a calendar week.
pub fn summary_counts<Tz: TimeZone>(
    entries: &[Entry],
    scheme: StatusScheme,
    now: &DateTime<Tz>,
) -> SummaryCounts {
    let zone = now.timezone();
    let today = now.date_naive();
    let week = TimeDelta::days(7);

    let mut counts = SummaryCounts {
        by_status: scheme
            .statuses()
            .into_iter()
            .map(|status| StatusCount { status, count: 0 })
            .collect(),
        ..Default::default()
    };

    for entry in entries {
        let created = entry.created_at.with_timezone(&zone);
        if created.date_naive() == today {
            counts.today += 1;
        }
        if now.naive_utc() - entry.created_at.naive_utc() < week {
            counts.this_week += 1;
        }
        if created.year() == now.year() && created.month() == now.month() {
            counts.this_month += 1;
        }
        match counts
            .by_status
            .iter_mut()
            .find(|item| item.status == entry.status)
        {
            Some(item) => item.count += 1,
            None => counts.by_status.push(StatusCount {
                status: entry.status.clone(),
                count: 1,
            }),
        }
    }

    counts
}
