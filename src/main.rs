mod cli;
mod db;
mod entities;
mod error;
mod metrics;
mod model;
mod mutators;
mod storage;
mod store;
mod util;

use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{
    Cli, Command, EntryAdd, EntryCommand, EntryEdit, EntryList, EntryProgress, EntryRemove,
    EntryShow, EntryStatus, EntryUpdate, IdeaAdd, IdeaCommand, IdeaEdit, IdeaRemove, SchemeArg,
    StepAdd, StepCommand, StepEdit, StepTarget,
};
use crate::error::AppError;
use crate::metrics::{idea_completion_percent, summary_counts};
use crate::model::{Entry, EntryChanges, Idea, Status, StatusScheme, Step};
use crate::store::LogStore;
use crate::util::{format_entry_detail, format_idea_line, format_summary};

const HOME_FLAG: &str = "--home";
const HOME_ENV: &str = "ANXIETY_CRUSHER_HOME";
const HOME_DIR_NAME: &str = ".anxiety-crusher";
const LOG_ENV: &str = "ANXIETY_CRUSHER_LOG";
const LOG_FORMAT_ENV: &str = "ANXIETY_CRUSHER_LOG_FORMAT";

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let Cli {
        home,
        scheme,
        command,
    } = Cli::parse();

    let home = resolve_home(home)?;
    let db_path = db::resolve_db_path(&home);
    db::ensure_parent_dir(&db_path)?;
    let mut lock = db::open_lock(&db_path)?;
    let _guard = lock.write()?;

    let db = db::connect(&db_path).await?;
    db::ensure_schema(&db).await?;
    let store = LogStore::new(db, status_scheme_from_arg(scheme));

    match command {
        Command::Entry(command) => handle_entry(&store, command).await,
        Command::Idea(command) => handle_idea(&store, command).await,
        Command::Step(command) => handle_step(&store, command).await,
        Command::Summary => handle_summary(&store).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }
}

async fn handle_entry(store: &LogStore, command: EntryCommand) -> Result<(), AppError> {
    match command {
        EntryCommand::Add(args) => handle_entry_add(store, args).await,
        EntryCommand::List(args) => handle_entry_list(store, args).await,
        EntryCommand::Show(args) => handle_entry_show(store, args).await,
        EntryCommand::Update(args) => handle_entry_update(store, args).await,
        EntryCommand::Progress(args) => handle_entry_progress(store, args).await,
        EntryCommand::Status(args) => handle_entry_status(store, args).await,
        EntryCommand::Edit(args) => handle_entry_edit(store, args).await,
        EntryCommand::Remove(args) => handle_entry_remove(store, args).await,
    }
}

async fn handle_idea(store: &LogStore, command: IdeaCommand) -> Result<(), AppError> {
    match command {
        IdeaCommand::Add(args) => handle_idea_add(store, args).await,
        IdeaCommand::Edit(args) => handle_idea_edit(store, args).await,
        IdeaCommand::Remove(args) => handle_idea_remove(store, args).await,
    }
}

async fn handle_step(store: &LogStore, command: StepCommand) -> Result<(), AppError> {
    match command {
        StepCommand::Add(args) => handle_step_add(store, args).await,
        StepCommand::Edit(args) => handle_step_edit(store, args).await,
        StepCommand::Toggle(args) => handle_step_toggle(store, args).await,
        StepCommand::Remove(args) => handle_step_remove(store, args).await,
    }
}

async fn handle_entry_add(store: &LogStore, args: EntryAdd) -> Result<(), AppError> {
    require_non_empty("anxiety text", &args.text)?;
    let entry = store.create(&args.text, args.description.as_deref()).await?;
    println!("Logged anxiety ID: {}: {}", entry.id, entry.text);
    Ok(())
}

async fn handle_entry_list(store: &LogStore, args: EntryList) -> Result<(), AppError> {
    let wanted = args.status.as_deref().map(|status| Status::from(status.trim()));
    let entries: Vec<Entry> = store
        .load_all()
        .await?
        .into_iter()
        .filter(|entry| match &wanted {
            None => true,
            Some(status) => &entry.status == status,
        })
        .collect();

    if entries.is_empty() {
        println!("No anxieties found.");
        return Ok(());
    }
    print_entry_list(&entries);
    Ok(())
}

async fn handle_entry_show(store: &LogStore, args: EntryShow) -> Result<(), AppError> {
    let entry = store.get(&args.id).await?;
    println!("{}", format_entry_detail(&entry));
    Ok(())
}

async fn handle_entry_update(store: &LogStore, args: EntryUpdate) -> Result<(), AppError> {
    require_non_empty("update text", &args.text)?;
    let entry = store
        .mutate(&args.id, |entry| mutators::append_update(entry, &args.text))
        .await?;
    println!(
        "Added update to anxiety ID: {} ({} updates).",
        entry.id,
        entry.updates.len()
    );
    Ok(())
}

async fn handle_entry_progress(store: &LogStore, args: EntryProgress) -> Result<(), AppError> {
    let entry = store
        .mutate(&args.id, |entry| mutators::set_progress(entry, args.value))
        .await?;
    println!(
        "Progress for anxiety ID: {} set to {}%.",
        entry.id,
        entry.effective_progress()
    );
    Ok(())
}

async fn handle_entry_status(store: &LogStore, args: EntryStatus) -> Result<(), AppError> {
    let scheme = store.scheme();
    let status = Status::from(args.status.trim());
    if !scheme.contains(&status) {
        let allowed: Vec<String> = scheme
            .statuses()
            .iter()
            .map(|status| status.to_string())
            .collect();
        return Err(AppError::InvalidInput(format!(
            "status must be one of {} for the {} scheme",
            allowed.join(", "),
            scheme.as_str()
        )));
    }
    let entry = store
        .mutate(&args.id, |entry| mutators::set_status(entry, status))
        .await?;
    println!(
        "Anxiety ID: {} status set to {}.",
        entry.id,
        entry.status.label()
    );
    Ok(())
}

async fn handle_entry_edit(store: &LogStore, args: EntryEdit) -> Result<(), AppError> {
    let changes = EntryChanges {
        text: args.text,
        description: args.description,
    };
    if changes.is_empty() {
        return Err(AppError::InvalidInput(
            "entry edit requires --text or --description".to_string(),
        ));
    }
    if let Some(text) = &changes.text {
        require_non_empty("anxiety text", text)?;
    }
    let entry = store
        .mutate(&args.id, |entry| mutators::apply_changes(entry, &changes))
        .await?;
    println!("Updated anxiety ID: {}: {}", entry.id, entry.text);
    Ok(())
}

async fn handle_entry_remove(store: &LogStore, args: EntryRemove) -> Result<(), AppError> {
    let entry = store.delete(&args.id).await?;
    println!("Anxiety ID: {} removed.", entry.id);
    Ok(())
}

async fn handle_idea_add(store: &LogStore, args: IdeaAdd) -> Result<(), AppError> {
    require_non_empty("idea title", &args.title)?;
    let now = Utc::now();
    let entry = store
        .mutate(&args.entry_id, |entry| {
            mutators::add_idea(entry, &args.title, now)
        })
        .await?;
    let idea = entry
        .ideas
        .first()
        .ok_or_else(|| AppError::NotFound("idea not found after insert".to_string()))?;
    println!("Created idea ID: {} for anxiety ID: {}", idea.id, entry.id);
    Ok(())
}

async fn handle_idea_edit(store: &LogStore, args: IdeaEdit) -> Result<(), AppError> {
    require_non_empty("idea title", &args.title)?;
    let current = store.get(&args.entry_id).await?;
    require_idea(&current, &args.idea_id)?;
    let entry = store
        .mutate(&args.entry_id, |entry| {
            mutators::edit_idea_title(entry, &args.idea_id, &args.title)
        })
        .await?;
    let idea = require_idea(&entry, &args.idea_id)?;
    println!("Updated idea ID: {}: {}", idea.id, idea.title);
    Ok(())
}

async fn handle_idea_remove(store: &LogStore, args: IdeaRemove) -> Result<(), AppError> {
    let current = store.get(&args.entry_id).await?;
    require_idea(&current, &args.idea_id)?;
    store
        .mutate(&args.entry_id, |entry| {
            mutators::delete_idea(entry, &args.idea_id)
        })
        .await?;
    println!("Idea ID: {} removed.", args.idea_id);
    Ok(())
}

async fn handle_step_add(store: &LogStore, args: StepAdd) -> Result<(), AppError> {
    require_non_empty("step text", &args.text)?;
    let current = store.get(&args.entry_id).await?;
    require_idea(&current, &args.idea_id)?;
    let now = Utc::now();
    let entry = store
        .mutate(&args.entry_id, |entry| {
            mutators::add_step(entry, &args.idea_id, &args.text, now)
        })
        .await?;
    let idea = require_idea(&entry, &args.idea_id)?;
    let step = idea
        .steps
        .last()
        .ok_or_else(|| AppError::NotFound("step not found after insert".to_string()))?;
    println!("Created step ID: {} for idea ID: {}", step.id, idea.id);
    Ok(())
}

async fn handle_step_edit(store: &LogStore, args: StepEdit) -> Result<(), AppError> {
    require_non_empty("step text", &args.text)?;
    let current = store.get(&args.entry_id).await?;
    require_step(&current, &args.idea_id, &args.step_id)?;
    let entry = store
        .mutate(&args.entry_id, |entry| {
            mutators::edit_step_text(entry, &args.idea_id, &args.step_id, &args.text)
        })
        .await?;
    let step = require_step(&entry, &args.idea_id, &args.step_id)?;
    println!("Updated step ID: {}: {}", step.id, step.text);
    Ok(())
}

async fn handle_step_toggle(store: &LogStore, args: StepTarget) -> Result<(), AppError> {
    let current = store.get(&args.entry_id).await?;
    require_step(&current, &args.idea_id, &args.step_id)?;
    let entry = store
        .mutate(&args.entry_id, |entry| {
            mutators::toggle_step(entry, &args.idea_id, &args.step_id)
        })
        .await?;
    let idea = require_idea(&entry, &args.idea_id)?;
    let step = require_step(&entry, &args.idea_id, &args.step_id)?;
    if step.done {
        println!("Step ID: {} marked done.", step.id);
    } else {
        println!("Step ID: {} marked not done.", step.id);
    }
    println!(
        "Idea ID: {} is {}% complete.",
        idea.id,
        idea_completion_percent(idea)
    );
    Ok(())
}

async fn handle_step_remove(store: &LogStore, args: StepTarget) -> Result<(), AppError> {
    let current = store.get(&args.entry_id).await?;
    require_step(&current, &args.idea_id, &args.step_id)?;
    store
        .mutate(&args.entry_id, |entry| {
            mutators::delete_step(entry, &args.idea_id, &args.step_id)
        })
        .await?;
    println!("Step ID: {} removed.", args.step_id);
    Ok(())
}

async fn handle_summary(store: &LogStore) -> Result<(), AppError> {
    let entries = store.load_all().await?;
    let counts = summary_counts(&entries, store.scheme(), &Local::now());
    println!("{}", format_summary(&counts));
    Ok(())
}

fn resolve_home(home: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = home {
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(AppError::InvalidInput(format!("{HOME_FLAG} is empty")));
        }
        if path.is_absolute() {
            return Ok(path);
        }
        return Ok(std::env::current_dir()?.join(path));
    }

    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home).join(HOME_DIR_NAME));
        }
    }

    Err(AppError::InvalidInput(format!(
        "unable to resolve data directory; set {HOME_ENV} or pass {HOME_FLAG}"
    )))
}

fn status_scheme_from_arg(arg: SchemeArg) -> StatusScheme {
    match arg {
        SchemeArg::Classic => StatusScheme::Classic,
        SchemeArg::Brainstorm => StatusScheme::Brainstorm,
    }
}

fn require_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{label} cannot be empty")));
    }
    Ok(())
}

fn require_idea<'a>(entry: &'a Entry, idea_id: &str) -> Result<&'a Idea, AppError> {
    entry
        .idea(idea_id)
        .ok_or_else(|| AppError::NotFound(format!("idea id {idea_id} on anxiety id {}", entry.id)))
}

fn require_step<'a>(entry: &'a Entry, idea_id: &str, step_id: &str) -> Result<&'a Step, AppError> {
    require_idea(entry, idea_id)?
        .step(step_id)
        .ok_or_else(|| AppError::NotFound(format!("step id {step_id} on idea id {idea_id}")))
}

fn print_entry_list(entries: &[Entry]) {
    println!(
        "{:<14} {:<12} {:<5} {:<8} {:<6} {}",
        "ID", "STATUS", "PROG", "UPDATES", "IDEAS", "TEXT"
    );
    for entry in entries {
        println!(
            "{:<14} {:<12} {:<5} {:<8} {:<6} {}",
            entry.id,
            entry.status.label(),
            format!("{}%", entry.effective_progress()),
            entry.updates.len(),
            entry.ideas.len(),
            entry.text
        );
        for idea in &entry.ideas {
            println!("  {}", format_idea_line(idea));
        }
    }
}
