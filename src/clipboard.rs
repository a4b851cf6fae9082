use anyhow::{Context, Result};
use arboard::Clipboard;

/// Reads plain text from the system clipboard for Ctrl+V.
///
/// Terminals that support bracketed paste deliver their own paste events; this
/// covers the ones that don't, and sessions where the user copied from a GUI
/// app without a terminal-level paste binding.
pub fn read_clipboard_text() -> Result<String> {
    let mut clipboard = Clipboard::new().context("failed to open the system clipboard")?;
    clipboard
        .get_text()
        .context("clipboard does not contain text")
}
