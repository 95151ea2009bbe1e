//! Row grouping
//!
//! Clusters tokens into text lines by vertical centroid distance.

use tracing::debug;

use crate::vision::Token;

/// Starting reference far above any real coordinate, so the first token always opens a row
const INITIAL_LAST_Y: f64 = -1000.0;

/// Tokens sharing one inferred text line, left to right
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub tokens: Vec<Token>,
}

impl Row {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Token texts joined with single spaces
    pub fn line(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Category of the first token, if assigned
    pub fn category(&self) -> Option<&str> {
        self.tokens.first().and_then(|t| t.category.as_deref())
    }

    /// Label every token with `category`
    pub fn set_category(&mut self, category: &str) {
        for token in &mut self.tokens {
            token.category = Some(category.to_string());
        }
    }

    fn sort_left_to_right(&mut self) {
        self.tokens
            .sort_by(|a, b| a.centroid.x.total_cmp(&b.centroid.x));
    }
}

/// Group tokens into rows ordered top to bottom.
///
/// A token opens a new row when its vertical centroid differs from the
/// previous token's by more than `y_threshold`. The reference is the last
/// token processed, not the row mean, so a staircase of slightly offset words
/// keeps extending one row.
pub fn group_rows(mut tokens: Vec<Token>, y_threshold: f64) -> Vec<Row> {
    tokens.sort_by(|a, b| a.centroid.y.total_cmp(&b.centroid.y));

    let mut rows = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut last_y = INITIAL_LAST_Y;

    for token in tokens {
        let y = token.centroid.y;
        if (y - last_y).abs() > y_threshold {
            flush_row(&mut rows, &mut current);
        }
        current.push(token);
        last_y = y;
    }
    flush_row(&mut rows, &mut current);

    debug!("Grouped tokens into {} rows", rows.len());
    rows
}

fn flush_row(rows: &mut Vec<Row>, current: &mut Vec<Token>) {
    if current.is_empty() {
        return;
    }
    let mut row = Row::new(std::mem::take(current));
    row.sort_left_to_right();
    rows.push(row);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, x: f64, y: f64) -> Token {
        Token::from_rect(text, 0.9, x - 10.0, y - 5.0, 20.0, 10.0)
    }

    fn texts(row: &Row) -> Vec<&str> {
        row.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_groups_lines_and_orders_words() {
        let tokens = vec![
            token("180", 400.0, 102.0),
            token("Tikka", 150.0, 98.0),
            token("STARTERS", 100.0, 50.0),
            token("Paneer", 60.0, 100.0),
        ];

        let rows = group_rows(tokens, 15.0);
        assert_eq!(rows.len(), 2);
        assert_eq!(texts(&rows[0]), vec!["STARTERS"]);
        assert_eq!(texts(&rows[1]), vec!["Paneer", "Tikka", "180"]);
        assert_eq!(rows[1].line(), "Paneer Tikka 180");
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let tokens = vec![token("a", 0.0, 100.0), token("b", 10.0, 115.0)];
        assert_eq!(group_rows(tokens.clone(), 15.0).len(), 1);
        assert_eq!(group_rows(tokens, 14.9).len(), 2);
    }

    #[test]
    fn test_drift_follows_last_token() {
        // Each step is within the threshold, so the staircase stays one row
        // even though the first and last words are 40px apart.
        let tokens = vec![
            token("one", 0.0, 100.0),
            token("two", 50.0, 110.0),
            token("three", 100.0, 120.0),
            token("four", 150.0, 130.0),
            token("five", 200.0, 140.0),
        ];

        let rows = group_rows(tokens, 15.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tokens.len(), 5);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_rows(Vec::new(), 15.0).is_empty());
    }

    #[test]
    fn test_rows_partition_tokens() {
        let mut tokens = Vec::new();
        for i in 0..40 {
            let x = ((i * 37) % 500) as f64;
            let y = ((i * 53) % 300) as f64;
            tokens.push(token(&format!("w{i}"), x, y));
        }

        for threshold in [0.0, 3.0, 15.0, 80.0, 1000.0] {
            let rows = group_rows(tokens.clone(), threshold);
            let mut seen: Vec<String> = rows
                .iter()
                .flat_map(|r| r.tokens.iter().map(|t| t.text.clone()))
                .collect();
            seen.sort();
            let mut expected: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
            expected.sort();
            assert_eq!(seen, expected, "threshold {threshold}");

            for row in &rows {
                assert!(!row.tokens.is_empty());
                for pair in row.tokens.windows(2) {
                    assert!(pair[0].centroid.x <= pair[1].centroid.x);
                }
            }
        }
    }

    #[test]
    fn test_set_category_labels_every_token() {
        let mut row = Row::new(vec![token("Masala", 0.0, 0.0), token("Dosa", 30.0, 0.0)]);
        assert!(row.category().is_none());

        row.set_category("SOUTH INDIAN");
        assert_eq!(row.category(), Some("SOUTH INDIAN"));
        assert!(row.tokens.iter().all(|t| t.category.as_deref() == Some("SOUTH INDIAN")));
    }
}
