//! Non-menu entry filter
//!
//! Drops entries whose text mentions boilerplate such as calories or
//! preparation time. Only folder processing applies it.

use tracing::debug;

use super::menu::MenuEntry;
use super::patterns::Lexicon;

/// Whether item, category or description contains an ignored phrase
pub fn is_ignored(entry: &MenuEntry, lexicon: &Lexicon) -> bool {
    let combined = format!("{} {} {}", entry.item, entry.category, entry.description).to_lowercase();
    lexicon
        .ignore_phrases()
        .iter()
        .any(|phrase| combined.contains(phrase.as_str()))
}

/// Keep entries that contain no ignored phrase, preserving order
pub fn filter_entries(entries: Vec<MenuEntry>, lexicon: &Lexicon) -> Vec<MenuEntry> {
    let before = entries.len();
    let kept: Vec<MenuEntry> = entries
        .into_iter()
        .filter(|entry| !is_ignored(entry, lexicon))
        .collect();
    if kept.len() != before {
        debug!("Entry filter dropped {} of {} entries", before - kept.len(), before);
    }
    kept
}
