use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "anxiety-crusher",
    version,
    about = "Log worries, track their progress and brainstorm ways through them"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "ANXIETY_CRUSHER_HOME",
        value_name = "PATH",
        help = "Directory holding the anxiety log"
    )]
    pub home: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "ANXIETY_CRUSHER_SCHEME",
        value_enum,
        default_value = "classic",
        help = "Status set used for new entries and summaries"
    )]
    pub scheme: SchemeArg,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Entry(EntryCommand),
    #[command(subcommand)]
    Idea(IdeaCommand),
    #[command(subcommand)]
    Step(StepCommand),
    Summary,
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    Add(EntryAdd),
    List(EntryList),
    Show(EntryShow),
    Update(EntryUpdate),
    Progress(EntryProgress),
    Status(EntryStatus),
    Edit(EntryEdit),
    Remove(EntryRemove),
}

#[derive(Subcommand, Debug)]
pub enum IdeaCommand {
    Add(IdeaAdd),
    Edit(IdeaEdit),
    Remove(IdeaRemove),
}

#[derive(Subcommand, Debug)]
pub enum StepCommand {
    Add(StepAdd),
    Edit(StepEdit),
    Toggle(StepTarget),
    Remove(StepTarget),
}

#[derive(Args, Debug)]
pub struct EntryAdd {
    pub text: String,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct EntryList {
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args, Debug)]
pub struct EntryShow {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct EntryUpdate {
    pub id: String,
    pub text: String,
}

#[derive(Args, Debug)]
pub struct EntryProgress {
    pub id: String,
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    pub value: u8,
}

#[derive(Args, Debug)]
pub struct EntryStatus {
    pub id: String,
    pub status: String,
}

#[derive(Args, Debug)]
pub struct EntryEdit {
    pub id: String,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct EntryRemove {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct IdeaAdd {
    pub entry_id: String,
    pub title: String,
}

#[derive(Args, Debug)]
pub struct IdeaEdit {
    pub entry_id: String,
    pub idea_id: String,
    pub title: String,
}

#[derive(Args, Debug)]
pub struct IdeaRemove {
    pub entry_id: String,
    pub idea_id: String,
}

#[derive(Args, Debug)]
pub struct StepAdd {
    pub entry_id: String,
    pub idea_id: String,
    pub text: String,
}

#[derive(Args, Debug)]
pub struct StepEdit {
    pub entry_id: String,
    pub idea_id: String,
    pub step_id: String,
    pub text: String,
}

#[derive(Args, Debug)]
pub struct StepTarget {
    pub entry_id: String,
    pub idea_id: String,
    pub step_id: String,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum SchemeArg {
    Classic,
    Brainstorm,
}
