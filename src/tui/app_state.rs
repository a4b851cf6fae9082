use crate::dialog::SettingsHost;
use crate::i18n::Language;

/// Everything the parent screen owns: the language and whether the settings
/// dialog is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    pub lang: Language,
    pub settings_open: bool,
    pub quit: bool,
    /// One-line message shown under the summary, e.g. a failed save.
    pub status: Option<String>,
}

impl ShellState {
    pub fn new(lang: Language, settings_open: bool) -> Self {
        ShellState {
            lang,
            settings_open,
            quit: false,
            status: None,
        }
    }
}

impl SettingsHost for ShellState {
    fn on_close(&mut self) {
        self.settings_open = false;
    }

    fn set_lang(&mut self, lang: Language) {
        self.lang = lang;
    }
}
