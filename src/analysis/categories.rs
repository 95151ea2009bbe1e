//! Section header detection
//!
//! Short, capitalized, price-free lines are taken as section titles and label
//! the content lines below them.

use tracing::debug;

use super::patterns::{contains_price, is_titlecase_word, is_uppercase_word};
use super::rows::Row;

/// Category of content seen before any header
pub const UNCATEGORIZED: &str = "Uncategorized";

const MAX_HEADER_CHARS: usize = 35;
const MAX_HEADER_WORDS: usize = 4;

/// Whether a price-free line reads like a section header
pub fn is_probable_header(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    let capitalized = words
        .iter()
        .filter(|w| is_uppercase_word(w) || is_titlecase_word(w))
        .count();

    capitalized >= (words.len() / 2).max(1)
        && line.chars().count() <= MAX_HEADER_CHARS
        && words.len() <= MAX_HEADER_WORDS
}

/// Running category state, fresh for every image
#[derive(Debug, Clone)]
pub struct CategoryAssigner {
    current_category: String,
}

impl Default for CategoryAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryAssigner {
    pub fn new() -> Self {
        Self {
            current_category: UNCATEGORIZED.to_string(),
        }
    }

    #[cfg(test)]
    pub fn current_category(&self) -> &str {
        &self.current_category
    }

    /// Classify one row. Header rows update the state and are consumed;
    /// content rows come back labelled with the current category.
    pub fn assign_row(&mut self, mut row: Row) -> Option<Row> {
        let line = row.line();
        let line = line.trim();

        if !contains_price(line) && is_probable_header(line) {
            debug!("Header row: {:?}", line);
            self.current_category = line.to_string();
            return None;
        }

        row.set_category(&self.current_category);
        Some(row)
    }

    /// Run a fresh assigner over the rows of one image
    pub fn assign(rows: Vec<Row>) -> Vec<Row> {
        let mut assigner = Self::new();
        rows.into_iter()
            .filter_map(|row| assigner.assign_row(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::Token;

    fn row(line: &str, y: f64) -> Row {
        let tokens = line
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| Token::from_rect(w, 0.9, i as f64 * 50.0, y, 40.0, 10.0))
            .collect();
        Row::new(tokens)
    }

    #[test]
    fn test_header_heuristic() {
        assert!(is_probable_header("STARTERS"));
        assert!(is_probable_header("Main Course"));
        assert!(is_probable_header("South Indian specials here"));
        assert!(!is_probable_header("served with sambar and chutney"));
        assert!(!is_probable_header("Fresh Lime Soda Sweet Salted"));
        assert!(!is_probable_header("Chef Recommends Extraordinarily-Long"));
    }

    #[test]
    fn test_header_length_limit() {
        let exactly = "ABCDEFGHIJKLMNOPQRSTUVWXYZ ABCDEFGH";
        assert_eq!(exactly.chars().count(), 35);
        assert!(is_probable_header(exactly));
        assert!(!is_probable_header("ABCDEFGHIJKLMNOPQRSTUVWXYZ ABCDEFGHI"));
    }

    #[test]
    fn test_half_of_words_rounds_down() {
        // 3 words -> at least one capitalized word needed
        assert!(is_probable_header("Soups of today"));
        assert!(!is_probable_header("soups of today"));
    }

    #[test]
    fn test_assigns_category_to_following_rows() {
        let rows = vec![
            row("STARTERS", 10.0),
            row("Paneer Tikka 180", 40.0),
            row("Veg Spring Roll 150", 70.0),
        ];

        let content = CategoryAssigner::assign(rows);
        assert_eq!(content.len(), 2);
        assert!(content.iter().all(|r| r.category() == Some("STARTERS")));
    }

    #[test]
    fn test_price_rows_never_headers() {
        let rows = vec![row("DESSERTS", 0.0), row("KULFI 80", 30.0)];
        let content = CategoryAssigner::assign(rows);
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].line(), "KULFI 80");
        assert_eq!(content[0].category(), Some("DESSERTS"));
    }

    #[test]
    fn test_uncategorized_before_first_header() {
        let rows = vec![row("Tea 20", 0.0), row("BEVERAGES", 30.0), row("Coffee 30", 60.0)];
        let content = CategoryAssigner::assign(rows);
        assert_eq!(content[0].category(), Some(UNCATEGORIZED));
        assert_eq!(content[1].category(), Some("BEVERAGES"));
    }

    #[test]
    fn test_state_is_per_assigner() {
        let mut first = CategoryAssigner::new();
        assert!(first.assign_row(row("SWEETS", 0.0)).is_none());
        assert_eq!(first.current_category(), "SWEETS");

        let second = CategoryAssigner::new();
        assert_eq!(second.current_category(), UNCATEGORIZED);
    }

    #[test]
    fn test_lowercase_prose_is_content() {
        let mut assigner = CategoryAssigner::new();
        let content = assigner.assign_row(row("served with sambar and chutney", 0.0));
        assert_eq!(
            content.and_then(|r| r.category().map(str::to_string)),
            Some(UNCATEGORIZED.to_string())
        );
    }
}
