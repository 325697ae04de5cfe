//! Pure transformations applied to an entry before the store persists it.
//!
//! Every function takes the entry by value and hands back the new one. Blank
//! required text and unknown idea/step ids leave the entry as it was.

use std::collections::HashSet;

use chrono::{DateTime, SubsecRound, Utc};

use crate::model::{Entry, EntryChanges, Idea, Status, StatusScheme, Step};

/// Millisecond timestamp id, bumped past any id already taken in its scope.
pub fn next_id<'a, I>(taken: I, now: DateTime<Utc>) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = taken.into_iter().collect();
    let mut candidate = now.timestamp_millis();
    while taken.contains(candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

pub fn create_entry(
    existing: &[Entry],
    text: &str,
    description: Option<&str>,
    scheme: StatusScheme,
    now: DateTime<Utc>,
) -> Option<Entry> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(Entry {
        id: next_id(existing.iter().map(|entry| entry.id.as_str()), now),
        text: text.to_string(),
        description: description.map(str::trim).unwrap_or_default().to_string(),
        created_at: now.trunc_subsecs(3),
        status: scheme.initial(),
        updates: Vec::new(),
        progress: None,
        ideas: Vec::new(),
    })
}

pub fn append_update(mut entry: Entry, text: &str) -> Entry {
    if text.trim().is_empty() {
        return entry;
    }
    entry.updates.push(text.to_string());
    entry
}

pub fn set_progress(mut entry: Entry, value: u8) -> Entry {
    entry.progress = Some(value);
    entry
}

pub fn set_status(mut entry: Entry, status: Status) -> Entry {
    entry.status = status;
    entry
}

pub fn set_text(mut entry: Entry, text: &str) -> Entry {
    let text = text.trim();
    if text.is_empty() {
        return entry;
    }
    entry.text = text.to_string();
    entry
}

pub fn set_description(mut entry: Entry, description: &str) -> Entry {
    entry.description = description.trim().to_string();
    entry
}

pub fn apply_changes(entry: Entry, changes: &EntryChanges) -> Entry {
    let entry = match &changes.text {
        Some(text) => set_text(entry, text),
        None => entry,
    };
    match &changes.description {
        Some(description) => set_description(entry, description),
        None => entry,
    }
}

pub fn add_idea(mut entry: Entry, title: &str, now: DateTime<Utc>) -> Entry {
    let title = title.trim();
    if title.is_empty() {
        return entry;
    }
    let id = next_id(entry.ideas.iter().map(|idea| idea.id.as_str()), now);
    entry.ideas.insert(
        0,
        Idea {
            id,
            title: title.to_string(),
            steps: Vec::new(),
        },
    );
    entry
}

pub fn edit_idea_title(entry: Entry, idea_id: &str, title: &str) -> Entry {
    let title = title.trim();
    if title.is_empty() {
        return entry;
    }
    with_idea(entry, idea_id, |idea| idea.title = title.to_string())
}

pub fn delete_idea(mut entry: Entry, idea_id: &str) -> Entry {
    entry.ideas.retain(|idea| idea.id != idea_id);
    entry
}

pub fn add_step(entry: Entry, idea_id: &str, text: &str, now: DateTime<Utc>) -> Entry {
    if text.trim().is_empty() {
        return entry;
    }
    with_idea(entry, idea_id, |idea| {
        let id = next_id(idea.steps.iter().map(|step| step.id.as_str()), now);
        idea.steps.push(Step {
            id,
            text: text.to_string(),
            done: false,
        });
    })
}

pub fn toggle_step(entry: Entry, idea_id: &str, step_id: &str) -> Entry {
    with_step(entry, idea_id, step_id, |step| step.done = !step.done)
}

pub fn edit_step_text(entry: Entry, idea_id: &str, step_id: &str, text: &str) -> Entry {
    if text.trim().is_empty() {
        return entry;
    }
    with_step(entry, idea_id, step_id, |step| step.text = text.to_string())
}

pub fn delete_step(entry: Entry, idea_id: &str, step_id: &str) -> Entry {
    with_idea(entry, idea_id, |idea| {
        idea.steps.retain(|step| step.id != step_id)
    })
}

fn with_idea(mut entry: Entry, idea_id: &str, apply: impl FnOnce(&mut Idea)) -> Entry {
    if let Some(idea) = entry.ideas.iter_mut().find(|idea| idea.id == idea_id) {
        apply(idea);
    }
    entry
}

fn with_step(entry: Entry, idea_id: &str, step_id: &str, apply: impl FnOnce(&mut Step)) -> Entry {
    with_idea(entry, idea_id, |idea| {
        if let Some(step) = idea.steps.iter_mut().find(|step| step.id == step_id) {
            apply(step);
        }
    })
}
