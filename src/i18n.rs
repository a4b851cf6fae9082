use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Zh];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }

    /// Name shown on the selector button, always in the language itself.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Zh => "中文",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "zh" | "zh-cn" | "zh-tw" => Some(Language::Zh),
            _ => None,
        }
    }

    pub fn translations(self) -> &'static Translations {
        match self {
            Language::En => &EN,
            Language::Zh => &ZH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Every label the shell and dialog render. Adding a field forces every
/// language table to provide it.
#[derive(Debug)]
pub struct Translations {
    pub settings: &'static str,
    pub language: &'static str,
    pub hf_token: &'static str,
    pub token_total: &'static str,
    pub token_active: &'static str,
    pub token_exhausted: &'static str,
    pub hf_token_help: &'static str,
    pub hf_token_link: &'static str,
    pub hf_token_help_end: &'static str,
    pub cancel: &'static str,
    pub save: &'static str,
    pub show_token: &'static str,
    pub hide_token: &'static str,
    pub shell_title: &'static str,
    pub shell_hint: &'static str,
    pub current_language: &'static str,
    pub saved_tokens: &'static str,
    pub dialog_hint: &'static str,
}

pub const HF_TOKENS_URL: &str = "https://huggingface.co/settings/tokens";

static EN: Translations = Translations {
    settings: "Settings",
    language: "Language",
    hf_token: "Hugging Face Token",
    token_total: "Total",
    token_active: "Active",
    token_exhausted: "Exhausted",
    hf_token_help: "Get a free token from your",
    hf_token_link: "Hugging Face settings",
    hf_token_help_end: "to raise your rate limits. Separate multiple tokens with commas.",
    cancel: "Cancel",
    save: "Save",
    show_token: "Show",
    hide_token: "Hide",
    shell_title: "HF Settings",
    shell_hint: "s/Enter: Open settings | q/Esc: Quit",
    current_language: "Language",
    saved_tokens: "Saved tokens",
    dialog_hint: "Tab: Next | Ctrl+R: Reveal | Ctrl+V: Paste | Enter: Save | Esc: Cancel",
};

static ZH: Translations = Translations {
    settings: "设置",
    language: "语言",
    hf_token: "Hugging Face 令牌",
    token_total: "总数",
    token_active: "可用",
    token_exhausted: "已耗尽",
    hf_token_help: "前往",
    hf_token_link: "Hugging Face 设置页面",
    hf_token_help_end: "免费获取令牌以提高速率限制。多个令牌请用逗号分隔。",
    cancel: "取消",
    save: "保存",
    show_token: "显示",
    hide_token: "隐藏",
    shell_title: "HF 设置",
    shell_hint: "s/回车: 打开设置 | q/Esc: 退出",
    current_language: "语言",
    saved_tokens: "已保存令牌",
    dialog_hint: "Tab: 切换 | Ctrl+R: 显示 | Ctrl+V: 粘贴 | 回车: 保存 | Esc: 取消",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code(" ZH-CN "), Some(Language::Zh));
        assert_eq!(Language::from_code("fr"), None);
    }

    #[test]
    fn tables_differ_per_language() {
        assert_ne!(Language::En.translations().save, Language::Zh.translations().save);
        assert_eq!(Language::Zh.translations().save, "保存");
    }
}
