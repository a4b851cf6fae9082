use crate::dialog::SettingsDialog;
use crate::i18n::Language;
use crate::store::{
    EXHAUSTED_TOKENS_KEY, FileStore, HF_TOKEN_KEY, KeyValueStore, LANGUAGE_KEY, MemoryStore,
};
use crate::tokens::{StatsSource, TokenPool};
use crate::{cli, tui};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;

fn store_path(cli_args: &cli::Cli) -> PathBuf {
    cli_args.store.clone().unwrap_or_else(FileStore::default_path)
}

fn default_log_path(cli_args: &cli::Cli) -> PathBuf {
    store_path(cli_args).with_file_name("hf-settings.log")
}

/// Where log output goes: `--log-file` if given, else a file next to the store
/// for interactive runs. Dry runs and headless runs log to stderr so that
/// nothing is written under the config directory.
pub fn log_file(cli_args: &cli::Cli) -> Option<PathBuf> {
    if cli_args.log_file.is_some() {
        return cli_args.log_file.clone();
    }
    (!cli_args.is_headless() && !cli_args.dry_run).then(|| default_log_path(cli_args))
}

// CLI flag first, then the saved preference, then English.
fn resolve_language(cli_lang: Option<Language>, store: &impl KeyValueStore) -> Result<Language> {
    if let Some(lang) = cli_lang {
        return Ok(lang);
    }
    let stored = store.get(LANGUAGE_KEY).context("failed to read saved language")?;
    Ok(match stored.as_deref() {
        None => Language::default(),
        Some(code) => Language::from_code(code).unwrap_or_else(|| {
            log::warn!("unknown saved language '{}', falling back to English", code);
            Language::default()
        }),
    })
}

// Applies the headless flags in a fixed order: exhausted-set edits, then the
// token, then the stats report, so `--set-token X --stats` reports on X.
fn run_headless_mode(
    cli_args: &cli::Cli,
    store: &mut impl KeyValueStore,
    out: &mut impl Write,
) -> Result<()> {
    let mut pool = TokenPool::load(&*store).context("failed to load exhausted tokens")?;

    if cli_args.clear_exhausted || !cli_args.mark_exhausted.is_empty() {
        if cli_args.clear_exhausted {
            pool.clear();
        }
        for token in &cli_args.mark_exhausted {
            if !pool.mark_exhausted(token) {
                writeln!(out, "'{}' was already marked as exhausted.", token.trim())?;
            }
        }
        pool.save(store).context("failed to save exhausted tokens")?;
    }

    if let Some(value) = &cli_args.set_token {
        let mut host = tui::ShellState::new(cli_args.lang.unwrap_or_default(), true);
        let mut dialog = SettingsDialog::new(pool.clone());
        dialog.sync_open(host.settings_open, &*store)?;
        dialog.set_token(value.as_str());
        dialog.save(store, &mut host).context("failed to save token")?;
        writeln!(out, "Saved {} token(s).", dialog.stats().total)?;
    }

    if cli_args.stats {
        let stored = store.get(HF_TOKEN_KEY).context("failed to read saved token")?;
        let stats = pool.token_stats(stored.as_deref().unwrap_or_default());
        writeln!(out, "Total:     {}", stats.total)?;
        writeln!(out, "Active:    {}", stats.active)?;
        writeln!(out, "Exhausted: {}", stats.exhausted)?;
    }
    Ok(())
}

fn run_interactive_mode<S: KeyValueStore>(cli_args: &cli::Cli, store: S) -> Result<()> {
    let lang = resolve_language(cli_args.lang, &store)?;
    let pool = TokenPool::load(&store).context("failed to load exhausted tokens")?;
    let app = tui::TuiApp::new(store, SettingsDialog::new(pool), lang, cli_args.open);
    let app = tui::run_tui(app)?;
    log::info!("exiting with language {}", app.lang().code());
    Ok(())
}

fn run_with_store(cli_args: &cli::Cli, mut store: impl KeyValueStore) -> Result<()> {
    if cli_args.is_headless() {
        let stdout = io::stdout();
        return run_headless_mode(cli_args, &mut store, &mut stdout.lock());
    }
    run_interactive_mode(cli_args, store)
}

pub fn run_hf_settings(cli_args: cli::Cli) -> Result<()> {
    let file_store = FileStore::new(store_path(&cli_args));
    log::debug!("using store {}", file_store.path().display());

    if cli_args.dry_run {
        let snapshot = MemoryStore::seeded_from(
            &file_store,
            &[HF_TOKEN_KEY, EXHAUSTED_TOKENS_KEY, LANGUAGE_KEY],
        )
        .context("failed to read store")?;
        println!("(Dry run: changes will not be written to {})", file_store.path().display());
        return run_with_store(&cli_args, snapshot);
    }
    run_with_store(&cli_args, file_store)
}
