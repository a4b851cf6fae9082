use crate::store::{EXHAUSTED_TOKENS_KEY, KeyValueStore, StoreError};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenStats {
    pub total: usize,
    pub active: usize,
    pub exhausted: usize,
}

/// Derives [`TokenStats`] from raw field text.
///
/// Implementations must be pure and must not fail: empty or malformed text
/// yields zero counts.
pub trait StatsSource {
    fn token_stats(&self, token_text: &str) -> TokenStats;
}

impl<F> StatsSource for F
where
    F: Fn(&str) -> TokenStats,
{
    fn token_stats(&self, token_text: &str) -> TokenStats {
        self(token_text)
    }
}

/// Individual tokens of a comma-joined field, trimmed, empty entries skipped.
pub fn split_tokens(token_text: &str) -> impl Iterator<Item = &str> {
    token_text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Default stats source: counts tokens and checks them against the set of
/// tokens known to be out of quota.
#[derive(Debug, Default, Clone)]
pub struct TokenPool {
    exhausted: HashSet<String>,
}

impl TokenPool {
    pub fn new<I, S>(exhausted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TokenPool {
            exhausted: exhausted.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads the exhausted set from the store. A missing or unreadable list
    /// counts as empty.
    pub fn load(store: &impl KeyValueStore) -> Result<Self, StoreError> {
        let Some(raw) = store.get(EXHAUSTED_TOKENS_KEY)? else {
            return Ok(TokenPool::default());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => Ok(TokenPool::new(list)),
            Err(e) => {
                log::warn!("ignoring malformed {}: {}", EXHAUSTED_TOKENS_KEY, e);
                Ok(TokenPool::default())
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        let mut list: Vec<&str> = self.exhausted.iter().map(String::as_str).collect();
        list.sort_unstable();
        store.set(EXHAUSTED_TOKENS_KEY, &serde_json::to_string(&list)?)
    }

    /// Returns `false` if the token was already marked.
    pub fn mark_exhausted(&mut self, token: &str) -> bool {
        self.exhausted.insert(token.trim().to_string())
    }

    pub fn clear(&mut self) {
        self.exhausted.clear();
    }

    pub fn is_exhausted(&self, token: &str) -> bool {
        self.exhausted.contains(token)
    }
}

impl StatsSource for TokenPool {
    fn token_stats(&self, token_text: &str) -> TokenStats {
        let (total, exhausted) = split_tokens(token_text).fold((0, 0), |(total, exhausted), t| {
            (total + 1, exhausted + usize::from(self.is_exhausted(t)))
        });
        TokenStats {
            total,
            active: total - exhausted,
            exhausted,
        }
    }
}

/// Collapses multi-line pasted text into a comma-joined token list.
///
/// Returns `None` when the text has no line break, meaning the paste should be
/// inserted unchanged.
pub fn normalize_pasted(text: &str) -> Option<String> {
    if !text.contains(['\n', '\r']) {
        return None;
    }
    let fragments: Vec<&str> = text
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();
    Some(fragments.join(","))
}

/// Replaces the characters in `start..end` of `original` with `insertion`.
///
/// Offsets count `char`s, not bytes. They are clamped to the length of
/// `original` and may be given in either order.
pub fn splice(original: &str, insertion: &str, start: usize, end: usize) -> String {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let start_byte = byte_offset(original, start);
    let end_byte = byte_offset(original, end);

    let mut out = String::with_capacity(original.len() - (end_byte - start_byte) + insertion.len());
    out.push_str(&original[..start_byte]);
    out.push_str(insertion);
    out.push_str(&original[end_byte..]);
    out
}

/// Byte index of the `char_idx`-th character, or `s.len()` past the end.
pub fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(byte_idx, _)| byte_idx)
}
