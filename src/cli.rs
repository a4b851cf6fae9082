use crate::i18n::Language;
use clap::Parser;
use std::path::PathBuf;

/// hf-settings – pick a UI language and manage Hugging Face access tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store file holding tokens and preferences
    /// (defaults to <config dir>/hf-settings/store.json)
    #[arg(long, env = "HF_SETTINGS_STORE", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// UI language, overriding the saved preference
    #[arg(long, value_enum)]
    pub lang: Option<Language>,

    /// Start with the settings dialog already open
    #[arg(long)]
    pub open: bool,

    /// Run headless: print total/active/exhausted counts for the saved tokens and exit
    #[arg(long)]
    pub stats: bool,

    /// Run headless: save a comma-separated token list (trimmed) and exit
    #[arg(long, value_name = "TOKENS")]
    pub set_token: Option<String>,

    /// Run headless: mark a token as exhausted.
    /// Can be specified multiple times.
    #[arg(long, value_name = "TOKEN")]
    pub mark_exhausted: Vec<String>,

    /// Run headless: forget all exhausted tokens
    #[arg(long)]
    pub clear_exhausted: bool,

    /// Read the store but keep every change in memory
    #[arg(long)]
    pub dry_run: bool,

    /// Write log output to this file instead of stderr.
    /// Interactive runs other than --dry-run default to a log file next to the store.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.stats || self.set_token.is_some() || !self.mark_exhausted.is_empty() || self.clear_exhausted
    }
}
