use super::app_state::ShellState;
use crate::dialog::{Focus, SettingsDialog};
use crate::i18n::Language;
use crate::store::{HF_TOKEN_KEY, KeyValueStore, LANGUAGE_KEY};
use crate::tokens::{StatsSource, TokenStats};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub type ClipboardReader = fn() -> Result<String>;

pub struct TuiApp<S, P> {
    pub(super) shell: ShellState,
    pub(super) dialog: SettingsDialog<P>,
    pub(super) store: S,
    /// Stats of what is currently persisted, shown on the shell screen.
    pub(super) saved_stats: TokenStats,
    persisted_lang: Language,
    read_clipboard: ClipboardReader,
}

impl<S: KeyValueStore, P: StatsSource> TuiApp<S, P> {
    pub fn new(store: S, dialog: SettingsDialog<P>, lang: Language, open: bool) -> Self {
        let mut app = TuiApp {
            shell: ShellState::new(lang, open),
            dialog,
            store,
            saved_stats: TokenStats::default(),
            persisted_lang: lang,
            read_clipboard: crate::clipboard::read_clipboard_text,
        };
        app.refresh_saved_stats();
        app.sync_dialog();
        app
    }

    #[cfg(test)]
    pub fn with_clipboard(mut self, reader: ClipboardReader) -> Self {
        self.read_clipboard = reader;
        self
    }

    pub fn should_quit(&self) -> bool {
        self.shell.quit
    }

    pub fn lang(&self) -> Language {
        self.shell.lang
    }

    pub(super) fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                if self.shell.settings_open {
                    self.handle_dialog_input(key_event);
                } else {
                    self.handle_shell_input(key_event);
                }
            }
            Event::Paste(text) if self.shell.settings_open => self.paste_into_token(&text),
            _ => {}
        }
        self.after_event();
    }

    fn handle_shell_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.shell.quit = true,
            KeyCode::Char('s') | KeyCode::Enter => {
                self.shell.status = None;
                self.shell.settings_open = true;
            }
            _ => {}
        }
    }

    fn handle_dialog_input(&mut self, key_event: KeyEvent) {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);

        match key_event.code {
            KeyCode::Esc => self.dialog.cancel(&mut self.shell),
            KeyCode::Tab => self.dialog.focus_next(),
            KeyCode::BackTab => self.dialog.focus_prev(),
            KeyCode::Char('r') if ctrl => self.dialog.toggle_reveal(),
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Char('v') if ctrl => self.paste_from_clipboard(),
            code => self.handle_focused_input(code, ctrl, shift),
        }
    }

    fn handle_focused_input(&mut self, code: KeyCode, ctrl: bool, shift: bool) {
        match self.dialog.focus() {
            Focus::Language => match code {
                KeyCode::Left | KeyCode::Char('1') => {
                    self.dialog.select_language(Language::En, &mut self.shell)
                }
                KeyCode::Right | KeyCode::Char('2') => {
                    self.dialog.select_language(Language::Zh, &mut self.shell)
                }
                KeyCode::Up => self.dialog.focus_prev(),
                KeyCode::Down | KeyCode::Enter => self.dialog.focus_next(),
                _ => {}
            },
            Focus::Token => match code {
                KeyCode::Enter => self.save(),
                KeyCode::Char('a') if ctrl => self.dialog.select_all(),
                KeyCode::Char(c) if !ctrl => self.dialog.insert_char(c),
                KeyCode::Backspace => self.dialog.backspace(),
                KeyCode::Delete => self.dialog.delete(),
                KeyCode::Left => self.dialog.move_caret(-1, shift),
                KeyCode::Right => self.dialog.move_caret(1, shift),
                KeyCode::Home => self.dialog.caret_home(shift),
                KeyCode::End => self.dialog.caret_end(shift),
                KeyCode::Up => self.dialog.focus_prev(),
                KeyCode::Down => self.dialog.focus_next(),
                _ => {}
            },
            Focus::Reveal | Focus::Cancel | Focus::Save => match code {
                KeyCode::Enter | KeyCode::Char(' ') => self.activate_button(),
                KeyCode::Char('1') => self.dialog.select_language(Language::En, &mut self.shell),
                KeyCode::Char('2') => self.dialog.select_language(Language::Zh, &mut self.shell),
                KeyCode::Left | KeyCode::Up => self.dialog.focus_prev(),
                KeyCode::Right | KeyCode::Down => self.dialog.focus_next(),
                _ => {}
            },
        }
    }

    fn activate_button(&mut self) {
        match self.dialog.focus() {
            Focus::Reveal => self.dialog.toggle_reveal(),
            Focus::Cancel => self.dialog.cancel(&mut self.shell),
            Focus::Save => self.save(),
            Focus::Language | Focus::Token => {}
        }
    }

    fn paste_into_token(&mut self, text: &str) {
        self.dialog.set_focus(Focus::Token);
        self.dialog.paste(text);
    }

    fn paste_from_clipboard(&mut self) {
        match (self.read_clipboard)() {
            Ok(text) => self.paste_into_token(&text),
            Err(e) => log::warn!("clipboard paste failed: {:#}", e),
        }
    }

    fn save(&mut self) {
        if let Err(e) = self.dialog.save(&mut self.store, &mut self.shell) {
            log::error!("failed to save token: {}", e);
            self.shell.status = Some(e.to_string());
        }
    }

    /// Reconciles the dialog and the store with whatever the last event did
    /// to the shell.
    fn after_event(&mut self) {
        let was_open = self.dialog.is_open();
        self.sync_dialog();
        if was_open && !self.shell.settings_open {
            self.refresh_saved_stats();
        }
        if self.shell.lang != self.persisted_lang {
            // Not retried on failure; the choice still applies for this session.
            self.persisted_lang = self.shell.lang;
            if let Err(e) = self.store.set(LANGUAGE_KEY, self.shell.lang.code()) {
                log::error!("failed to persist language: {}", e);
                self.shell.status = Some(e.to_string());
            }
        }
    }

    fn sync_dialog(&mut self) {
        if let Err(e) = self.dialog.sync_open(self.shell.settings_open, &self.store) {
            log::error!("failed to load token for settings dialog: {}", e);
            self.shell.status = Some(e.to_string());
            self.shell.settings_open = false;
        }
    }

    fn refresh_saved_stats(&mut self) {
        self.saved_stats = match self.store.get(HF_TOKEN_KEY) {
            Ok(stored) => self
                .dialog
                .stats_source()
                .token_stats(stored.as_deref().unwrap_or_default()),
            Err(e) => {
                log::warn!("could not read saved token: {}", e);
                TokenStats::default()
            }
        };
    }
}
