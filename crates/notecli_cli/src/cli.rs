use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "notecli",
    version = notecli_core::core_version(),
    about = "Keep short notes in a local file store"
)]
pub struct Cli {
    /// Note store file. Defaults to `<config dir>/notecli/notes.db`.
    #[arg(long, global = true, env = "NOTECLI_DB")]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "NOTECLI_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Add a note; opens the editor when CONTENT is omitted
    #[command(visible_alias = "a")]
    Add {
        content: Option<String>,
        #[arg(short = 'H', long, default_value = "")]
        headline: String,
        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Update a note by id; omitted fields keep their value
    #[command(visible_alias = "u")]
    Update {
        id: String,
        #[arg(short, long, default_value = "")]
        content: String,
        #[arg(short = 'H', long, default_value = "")]
        headline: String,
        /// Comma-separated tags replacing the current ones
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// List notes, optionally keeping those with any of the given tags
    #[command(visible_alias = "l")]
    List {
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Show a note by id
    #[command(visible_alias = "s")]
    Show { id: String },
    /// Find notes whose headline or content contains QUERY
    #[command(visible_alias = "f")]
    Search { query: String },
    /// Edit a note's content in $EDITOR
    #[command(visible_alias = "e")]
    Edit { id: String },
    /// Delete a note by id
    #[command(visible_alias = "d")]
    Delete { id: String },
}
