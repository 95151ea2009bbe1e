//! Lexical rules for menu text
//!
//! Price and split patterns are independent named objects; keyword and phrase
//! lists are plain data carried by [`Lexicon`].

use once_cell::sync::Lazy;
use regex::{Match, Regex};
use std::collections::HashSet;

use crate::config::LexiconSettings;

/// Optional rupee marker, optional space, 1-5 digits, optional 1-2 decimals
pub static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(₹|Rs\.?)?\s?\d{1,5}([.,]\d{1,2})?").expect("Invalid price regex")
});

/// Separators between several item names sharing one price
pub static ITEM_SPLIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}|,|/| - | \| |\. ").expect("Invalid item split regex")
});

/// Parenthesized notes such as "(Half)" or "(2 pcs)"
pub static PARENTHETICAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("Invalid parenthetical regex"));

static NON_WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w]").expect("Invalid non-word regex"));

static LATIN_LETTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z]").expect("Invalid latin letter regex"));

/// Characters trimmed from both ends of an item chunk
pub const CHUNK_SEPARATORS: &[char] = &[' ', '-', '–', '—', '|', ','];

/// Words never accepted as item names, compared after normalization
pub const DEFAULT_NOISE_KEYWORDS: &[&str] = &[
    "am", "pm", "yo", "l", "t", "a", "b", "/", "-", "|", ":", ".", ",", "–", "—", "_", "(", ")",
    "daily", "only", "each", "per", "day", "week", "month", "with", "served", "includes",
    "available", "mon", "tue", "wed", "thu", "fri", "sat", "sun", "timings", "timing", "from",
    "at", "till", "until", "for", "special", "offer", "extra", "add-on", "optional", "combo",
    "set", "option", "mrp", "gst", "inclusive", "exclusive", "taxes", "inc.", "excl.", "incl.",
];

/// Phrases that mark an entry as non-menu content
pub const DEFAULT_IGNORE_PHRASES: &[&str] =
    &["preparation time", "serving size", "cooking time", "calories"];

/// Keyword and phrase data used by the item and entry filters
#[derive(Debug, Clone)]
pub struct Lexicon {
    noise_keywords: HashSet<String>,
    ignore_phrases: Vec<String>,
}

impl Lexicon {
    pub fn new<K, P>(noise_keywords: K, ignore_phrases: P) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            noise_keywords: noise_keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            ignore_phrases: ignore_phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_settings(settings: &LexiconSettings) -> Self {
        Self::new(&settings.noise_keywords, &settings.ignore_phrases)
    }

    /// Whether a normalized word is a noise keyword
    pub fn is_noise(&self, normalized: &str) -> bool {
        self.noise_keywords.contains(normalized)
    }

    pub fn ignore_phrases(&self) -> &[String] {
        &self.ignore_phrases
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_KEYWORDS, DEFAULT_IGNORE_PHRASES)
    }
}

/// Whether the text contains a price
pub fn contains_price(text: &str) -> bool {
    PRICE_PATTERN.is_match(text)
}

/// All non-overlapping price matches, left to right
pub fn find_prices(text: &str) -> Vec<Match<'_>> {
    PRICE_PATTERN.find_iter(text).collect()
}

/// Remove all non-word characters and lowercase
pub fn normalize(text: &str) -> String {
    NON_WORD_PATTERN.replace_all(text, "").to_lowercase()
}

/// At least one cased character and no lowercase ones
pub fn is_uppercase_word(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Uppercase letters only start words, lowercase letters only continue them
pub fn is_titlecase_word(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}

/// Decide whether a candidate string can be a menu item name
pub fn is_valid_item(text: &str, lexicon: &Lexicon) -> bool {
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if length <= 2 {
        return false;
    }
    // Stray OCR artifacts such as "AM" or "VEG"
    if is_uppercase_word(trimmed) && length <= 3 {
        return false;
    }
    if lexicon.is_noise(&normalize(text)) {
        return false;
    }
    LATIN_LETTER_PATTERN.is_match(text)
}
