use crate::i18n::Language;
use crate::store::{HF_TOKEN_KEY, KeyValueStore, StoreError};
use crate::tokens::{StatsSource, TokenStats, normalize_pasted, splice, split_tokens};

/// Callbacks into whoever owns the dialog. The dialog never owns the language
/// or its own open flag.
pub trait SettingsHost {
    fn on_close(&mut self);
    fn set_lang(&mut self, lang: Language);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Language,
    Token,
    Reveal,
    Cancel,
    Save,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Language,
        Focus::Token,
        Focus::Reveal,
        Focus::Cancel,
        Focus::Save,
    ];

    fn step(self, delta: isize) -> Focus {
        let len = Self::ORDER.len() as isize;
        let pos = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(pos + delta).rem_euclid(len) as usize]
    }

    pub fn next(self) -> Focus {
        self.step(1)
    }

    pub fn prev(self) -> Focus {
        self.step(-1)
    }
}

/// Caret plus optional selection, in character offsets into the token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub caret: usize,
}

impl Selection {
    pub fn at(pos: usize) -> Self {
        Selection {
            anchor: pos,
            caret: pos,
        }
    }

    pub fn range(self) -> (usize, usize) {
        (self.anchor.min(self.caret), self.anchor.max(self.caret))
    }

    pub fn is_collapsed(self) -> bool {
        self.anchor == self.caret
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Line breaks were folded into commas.
    Normalized,
    /// Text was inserted as-is.
    Inserted,
}

pub struct SettingsDialog<P> {
    token: String,
    stats: TokenStats,
    show_token: bool,
    // None until the user places the caret; edits then fall back to the end.
    selection: Option<Selection>,
    focus: Focus,
    was_open: bool,
    stats_source: P,
}

impl<P: StatsSource> SettingsDialog<P> {
    pub fn new(stats_source: P) -> Self {
        SettingsDialog {
            token: String::new(),
            stats: TokenStats::default(),
            show_token: false,
            selection: None,
            focus: Focus::Token,
            was_open: false,
            stats_source,
        }
    }

    /// Tells the dialog the host's current open flag. Every closed -> open
    /// transition reloads the token from the store.
    pub fn sync_open(&mut self, is_open: bool, store: &impl KeyValueStore) -> Result<(), StoreError> {
        if is_open && !self.was_open {
            self.load(store)?;
        }
        self.was_open = is_open;
        Ok(())
    }

    fn load(&mut self, store: &impl KeyValueStore) -> Result<(), StoreError> {
        let stored = store.get(HF_TOKEN_KEY)?.unwrap_or_default();
        log::debug!("loaded token field ({} chars)", stored.chars().count());
        self.token = stored;
        self.selection = None;
        self.show_token = false;
        self.focus = Focus::Token;
        self.recompute_stats();
        Ok(())
    }

    /// Whether the last [`sync_open`](Self::sync_open) saw the dialog open.
    pub fn is_open(&self) -> bool {
        self.was_open
    }

    pub fn stats_source(&self) -> &P {
        &self.stats_source
    }

    fn recompute_stats(&mut self) {
        self.stats = self.stats_source.token_stats(&self.token);
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn stats(&self) -> TokenStats {
        self.stats
    }

    pub fn stats_visible(&self) -> bool {
        self.stats.total > 1
    }

    pub fn show_token(&self) -> bool {
        self.show_token
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    fn char_len(&self) -> usize {
        self.token.chars().count()
    }

    /// Selection bounds, falling back to a collapsed caret at the end.
    pub fn selection_bounds(&self) -> (usize, usize) {
        let len = self.char_len();
        match self.selection {
            Some(sel) => {
                let (start, end) = sel.range();
                (start.min(len), end.min(len))
            }
            None => (len, len),
        }
    }

    /// Caret position used for drawing the terminal cursor.
    pub fn caret(&self) -> usize {
        self.selection
            .map_or(self.char_len(), |sel| sel.caret.min(self.char_len()))
    }

    /// Replaces the whole value, as a form field's change event would.
    pub fn set_token(&mut self, value: impl Into<String>) {
        self.token = value.into();
        self.selection = Some(Selection::at(self.char_len()));
        self.recompute_stats();
    }

    fn replace_selection(&mut self, insertion: &str) {
        let (start, end) = self.selection_bounds();
        self.token = splice(&self.token, insertion, start, end);
        self.selection = Some(Selection::at(start + insertion.chars().count()));
        self.recompute_stats();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.replace_selection(c.encode_utf8(&mut buf));
    }

    pub fn backspace(&mut self) {
        let (start, end) = self.selection_bounds();
        if start != end {
            self.replace_selection("");
        } else if start > 0 {
            self.selection = Some(Selection {
                anchor: start - 1,
                caret: start,
            });
            self.replace_selection("");
        }
    }

    pub fn delete(&mut self) {
        let (start, end) = self.selection_bounds();
        if start != end {
            self.replace_selection("");
        } else if start < self.char_len() {
            self.selection = Some(Selection {
                anchor: start,
                caret: start + 1,
            });
            self.replace_selection("");
        }
    }

    fn place_caret(&mut self, pos: usize, extend: bool) {
        let pos = pos.min(self.char_len());
        let anchor = match (extend, self.selection) {
            (true, Some(sel)) => sel.anchor,
            (true, None) => self.char_len(),
            (false, _) => pos,
        };
        self.selection = Some(Selection { anchor, caret: pos });
    }

    pub fn move_caret(&mut self, delta: isize, extend: bool) {
        let current = self.caret();
        if !extend {
            if let Some(sel) = self.selection.filter(|s| !s.is_collapsed()) {
                // Collapse towards the direction of travel, like a text input.
                let (start, end) = sel.range();
                self.place_caret(if delta < 0 { start } else { end }, false);
                return;
            }
        }
        self.place_caret(current.saturating_add_signed(delta), extend);
    }

    pub fn caret_home(&mut self, extend: bool) {
        self.place_caret(0, extend);
    }

    pub fn caret_end(&mut self, extend: bool) {
        self.place_caret(self.char_len(), extend);
    }

    pub fn select_all(&mut self) {
        self.selection = Some(Selection {
            anchor: 0,
            caret: self.char_len(),
        });
    }

    /// Pastes `text` at the current selection. Multi-line text is folded into
    /// a comma-joined list first.
    pub fn paste(&mut self, text: &str) -> PasteOutcome {
        match normalize_pasted(text) {
            Some(normalized) => {
                log::debug!(
                    "normalized multi-line paste into {} tokens",
                    split_tokens(&normalized).count()
                );
                self.replace_selection(&normalized);
                PasteOutcome::Normalized
            }
            None => {
                self.replace_selection(text);
                PasteOutcome::Inserted
            }
        }
    }

    pub fn toggle_reveal(&mut self) {
        self.show_token = !self.show_token;
    }

    /// The field as it should be drawn: plain, or one bullet per character.
    pub fn display_value(&self) -> String {
        if self.show_token {
            self.token.clone()
        } else {
            "•".repeat(self.char_len())
        }
    }

    pub fn select_language(&mut self, lang: Language, host: &mut impl SettingsHost) {
        host.set_lang(lang);
    }

    pub fn cancel(&mut self, host: &mut impl SettingsHost) {
        host.on_close();
    }

    /// Persists the trimmed value and asks the host to close. On a store
    /// failure the host is not notified.
    pub fn save(
        &mut self,
        store: &mut impl KeyValueStore,
        host: &mut impl SettingsHost,
    ) -> Result<(), StoreError> {
        let trimmed = self.token.trim();
        store.set(HF_TOKEN_KEY, trimmed)?;
        log::info!("saved {} token(s)", split_tokens(trimmed).count());
        host.on_close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tokens::TokenPool;

    #[derive(Debug, Default)]
    struct RecordingHost {
        open: bool,
        closes: usize,
        langs: Vec<Language>,
    }

    impl SettingsHost for RecordingHost {
        fn on_close(&mut self) {
            self.open = false;
            self.closes += 1;
        }

        fn set_lang(&mut self, lang: Language) {
            self.langs.push(lang);
        }
    }

    fn opened(store: &MemoryStore) -> SettingsDialog<TokenPool> {
        let mut dialog = SettingsDialog::new(TokenPool::default());
        dialog.sync_open(true, store).unwrap();
        dialog
    }

    #[test]
    fn opening_with_empty_store_shows_nothing() {
        let store = MemoryStore::new();
        let dialog = opened(&store);
        assert_eq!(dialog.token(), "");
        assert_eq!(dialog.stats(), TokenStats::default());
        assert!(!dialog.stats_visible());
    }

    #[test]
    fn multi_line_paste_into_empty_field() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.caret_home(false);
        assert_eq!(dialog.paste("hf_a\nhf_b\r\nhf_c"), PasteOutcome::Normalized);
        assert_eq!(dialog.token(), "hf_a,hf_b,hf_c");
        assert_eq!(dialog.stats().total, 3);
        assert!(dialog.stats_visible());
    }

    #[test]
    fn multi_line_paste_after_existing_text() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.set_token("x");
        assert_eq!(dialog.selection_bounds(), (1, 1));
        dialog.paste("hf_a\nhf_b");
        assert_eq!(dialog.token(), "xhf_a,hf_b");
        assert_eq!(dialog.caret(), 10);
    }

    #[test]
    fn paste_without_caret_falls_back_to_end() {
        let mut store = MemoryStore::new();
        store.set(HF_TOKEN_KEY, "hf_1,").unwrap();
        let mut dialog = opened(&store);
        assert_eq!(dialog.selection(), None);
        dialog.paste("hf_2\nhf_3\n");
        assert_eq!(dialog.token(), "hf_1,hf_2,hf_3");
    }

    #[test]
    fn paste_replaces_selected_range() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.set_token("hf_old,hf_keep");
        dialog.caret_home(false);
        for _ in 0..6 {
            dialog.move_caret(1, true);
        }
        dialog.paste("hf_n1\nhf_n2");
        assert_eq!(dialog.token(), "hf_n1,hf_n2,hf_keep");
    }

    #[test]
    fn single_line_paste_is_inserted_unchanged() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        assert_eq!(dialog.paste("hf_solo"), PasteOutcome::Inserted);
        assert_eq!(dialog.token(), "hf_solo");
        assert_eq!(dialog.paste("  , hf_b"), PasteOutcome::Inserted);
        assert_eq!(dialog.token(), "hf_solo  , hf_b");
    }

    #[test]
    fn typing_then_saving_persists_and_closes() {
        let mut store = MemoryStore::new();
        let mut host = RecordingHost { open: true, ..Default::default() };
        let mut dialog = opened(&store);
        for c in "hf_1,hf_2,hf_3".chars() {
            dialog.insert_char(c);
        }
        assert_eq!(dialog.stats().total, 3);

        dialog.save(&mut store, &mut host).unwrap();

        assert_eq!(store.get(HF_TOKEN_KEY).unwrap().as_deref(), Some("hf_1,hf_2,hf_3"));
        assert!(!host.open);
        assert_eq!(host.closes, 1);
    }

    #[test]
    fn save_trims_and_reopen_round_trips() {
        let mut store = MemoryStore::new();
        let mut host = RecordingHost::default();
        let mut dialog = opened(&store);
        dialog.set_token("  \thf_a,hf_b \n");
        dialog.save(&mut store, &mut host).unwrap();
        dialog.sync_open(false, &store).unwrap();

        dialog.sync_open(true, &store).unwrap();
        assert_eq!(dialog.token(), "hf_a,hf_b");
    }

    #[test]
    fn empty_value_is_saved() {
        let mut store = MemoryStore::new();
        store.set(HF_TOKEN_KEY, "hf_old").unwrap();
        let mut host = RecordingHost::default();
        let mut dialog = opened(&store);
        dialog.select_all();
        dialog.backspace();
        dialog.save(&mut store, &mut host).unwrap();
        assert_eq!(store.get(HF_TOKEN_KEY).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn cancel_discards_edits() {
        let mut store = MemoryStore::new();
        store.set(HF_TOKEN_KEY, "hf_kept").unwrap();
        let mut host = RecordingHost { open: true, ..Default::default() };
        let mut dialog = opened(&store);
        dialog.set_token("hf_edited");
        dialog.cancel(&mut host);
        dialog.sync_open(host.open, &store).unwrap();

        assert_eq!(store.get(HF_TOKEN_KEY).unwrap().as_deref(), Some("hf_kept"));
        dialog.sync_open(true, &store).unwrap();
        assert_eq!(dialog.token(), "hf_kept");
    }

    #[test]
    fn every_open_rereads_the_store() {
        let mut store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.sync_open(false, &store).unwrap();

        store.set(HF_TOKEN_KEY, "hf_x,hf_y").unwrap();
        dialog.sync_open(true, &store).unwrap();
        assert_eq!(dialog.token(), "hf_x,hf_y");
        assert_eq!(dialog.stats().total, 2);

        // Staying open does not reload over in-progress edits.
        dialog.set_token("hf_typing");
        dialog.sync_open(true, &store).unwrap();
        assert_eq!(dialog.token(), "hf_typing");
    }

    #[test]
    fn reveal_toggle_only_changes_rendering() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.set_token("hf_secret");
        assert_eq!(dialog.display_value(), "•••••••••");
        dialog.toggle_reveal();
        assert_eq!(dialog.token(), "hf_secret");
        assert_eq!(dialog.display_value(), "hf_secret");
        dialog.toggle_reveal();
        assert_eq!(dialog.token(), "hf_secret");
        assert!(!dialog.show_token());
    }

    #[test]
    fn reopening_hides_the_token_again() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.toggle_reveal();
        dialog.sync_open(false, &store).unwrap();
        dialog.sync_open(true, &store).unwrap();
        assert!(!dialog.show_token());
    }

    #[test]
    fn stats_follow_every_edit() {
        let store = MemoryStore::new();
        let mut dialog = SettingsDialog::new(TokenPool::new(["hf_b"]));
        dialog.sync_open(true, &store).unwrap();
        dialog.set_token("hf_a,hf_b");
        assert_eq!(dialog.stats(), TokenStats { total: 2, active: 1, exhausted: 1 });
        dialog.backspace();
        dialog.backspace();
        dialog.backspace();
        dialog.backspace();
        assert_eq!(dialog.token(), "hf_a,");
        assert_eq!(dialog.stats(), TokenStats { total: 1, active: 1, exhausted: 0 });
        assert!(!dialog.stats_visible());
    }

    #[test]
    fn editing_handles_multibyte_text() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.set_token("令牌");
        dialog.move_caret(-1, false);
        dialog.insert_char('x');
        assert_eq!(dialog.token(), "令x牌");
        dialog.delete();
        assert_eq!(dialog.token(), "令x");
        dialog.caret_home(false);
        dialog.backspace();
        assert_eq!(dialog.token(), "令x");
    }

    #[test]
    fn arrow_collapses_selection() {
        let store = MemoryStore::new();
        let mut dialog = opened(&store);
        dialog.set_token("abcd");
        dialog.select_all();
        dialog.move_caret(-1, false);
        assert_eq!(dialog.selection(), Some(Selection::at(0)));
    }

    #[test]
    fn language_choice_goes_to_host() {
        let store = MemoryStore::new();
        let mut host = RecordingHost::default();
        let mut dialog = opened(&store);
        dialog.select_language(Language::Zh, &mut host);
        dialog.select_language(Language::En, &mut host);
        assert_eq!(host.langs, vec![Language::Zh, Language::En]);
        assert_eq!(host.closes, 0);
    }

    #[test]
    fn focus_cycles_both_ways() {
        assert_eq!(Focus::Save.next(), Focus::Language);
        assert_eq!(Focus::Language.prev(), Focus::Save);
        assert_eq!(Focus::Token.next(), Focus::Reveal);
    }
}
