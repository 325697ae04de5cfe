use chrono::{DateTime, Local, Utc};

use crate::metrics::idea_completion_percent;
use crate::model::{Entry, Idea, SummaryCounts};

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        percent
    )
}

pub fn format_idea_line(idea: &Idea) -> String {
    format!(
        "- {} (idea id {}, steps {}/{}, {}%)",
        idea.title,
        idea.id,
        idea.done_count(),
        idea.steps.len(),
        idea_completion_percent(idea)
    )
}

pub fn format_entry_detail(entry: &Entry) -> String {
    let mut output = String::new();
    output.push_str(&format!("Anxiety ID: {}\n", entry.id));
    output.push_str(&format!("Text: {}\n", entry.text));
    if !entry.description.trim().is_empty() {
        output.push_str(&format!("Description: {}\n", entry.description));
    }
    output.push_str(&format!("Status: {}\n", entry.status.label()));
    output.push_str(&format!(
        "Progress: {}\n",
        progress_bar(entry.effective_progress())
    ));
    output.push_str(&format!("Logged: {}\n", format_datetime(entry.created_at)));
    output.push('\n');

    if entry.updates.is_empty() {
        output.push_str("Updates: (none)\n");
    } else {
        output.push_str("Updates:\n");
        for update in &entry.updates {
            output.push_str(&format!("- {update}\n"));
        }
    }
    output.push('\n');

    if entry.ideas.is_empty() {
        output.push_str("Ideas: (none)");
        return output;
    }
    output.push_str("Ideas:\n");
    for idea in &entry.ideas {
        output.push_str(&format_idea_line(idea));
        output.push('\n');
        for step in &idea.steps {
            output.push_str(&format!(
                "  - [{}] {} (step id {})\n",
                if step.done { "x" } else { " " },
                step.text,
                step.id
            ));
        }
    }
    output.trim_end().to_string()
}

pub fn format_summary(counts: &SummaryCounts) -> String {
    let mut output = String::new();
    output.push_str(&format!("Today: {}\n", counts.today));
    output.push_str(&format!("This week: {}\n", counts.this_week));
    output.push_str(&format!("This month: {}\n", counts.this_month));
    output.push_str("By status:\n");
    for item in &counts.by_status {
        output.push_str(&format!("- {}: {}\n", item.status.label(), item.count));
    }
    output.trim_end().to_string()
}
