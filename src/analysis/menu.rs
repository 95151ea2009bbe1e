//! Menu entry parsing
//!
//! Pairs item names with the prices that follow them on a line and stitches
//! price-free lines onto the previous entry as its description.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::categories::UNCATEGORIZED;
use super::patterns::{
    find_prices, is_valid_item, Lexicon, CHUNK_SEPARATORS, ITEM_SPLIT_PATTERN,
    PARENTHETICAL_PATTERN,
};
use super::rows::Row;

/// One extracted menu line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Source image name
    pub image: String,
    pub category: String,
    pub item: String,
    /// Price text as matched, e.g. "₹ 120" or "Rs.60,5"
    pub price: String,
    /// Text of following price-free lines, each prefixed by a space
    pub description: String,
}

/// Split the text preceding a price into candidate item names
pub fn split_item_chunk(chunk: &str, lexicon: &Lexicon) -> Vec<String> {
    let chunk = chunk.trim_matches(CHUNK_SEPARATORS);
    ITEM_SPLIT_PATTERN
        .split(chunk)
        .map(|candidate| {
            PARENTHETICAL_PATTERN
                .replace_all(candidate, "")
                .trim()
                .to_string()
        })
        .filter(|candidate| is_valid_item(candidate, lexicon))
        .collect()
}

/// Item/price pairs found on one line, in reading order.
///
/// Every valid name in the chunk before a price receives that price's text.
/// Text after the last price is ignored.
pub fn pair_items_with_prices(line: &str, lexicon: &Lexicon) -> Vec<(String, String)> {
    let mut items = Vec::new();
    let mut prices = Vec::new();
    let mut start = 0;

    for found in find_prices(line) {
        let price = found.as_str().trim();
        for item in split_item_chunk(&line[start..found.start()], lexicon) {
            items.push(item);
            prices.push(price.to_string());
        }
        start = found.end();
    }

    let count = items.len().min(prices.len());
    items.into_iter().zip(prices).take(count).collect()
}

/// Entry-building state for the rows of one image
#[derive(Debug)]
pub struct MenuParser<'a> {
    image_name: String,
    lexicon: &'a Lexicon,
    entries: Vec<MenuEntry>,
    last_entry: Option<usize>,
}

impl<'a> MenuParser<'a> {
    pub fn new(image_name: impl Into<String>, lexicon: &'a Lexicon) -> Self {
        Self {
            image_name: image_name.into(),
            lexicon,
            entries: Vec::new(),
            last_entry: None,
        }
    }

    /// Consume one content row
    pub fn parse_row(&mut self, row: &Row) {
        let line = row.line();
        let line = line.trim();
        let category = row.category().unwrap_or(UNCATEGORIZED);

        if find_prices(line).is_empty() {
            self.append_description(category, line);
            return;
        }

        for (item, price) in pair_items_with_prices(line, self.lexicon) {
            self.entries.push(MenuEntry {
                image: self.image_name.clone(),
                category: category.to_string(),
                item,
                price,
                description: String::new(),
            });
            self.last_entry = Some(self.entries.len() - 1);
        }
    }

    fn append_description(&mut self, category: &str, line: &str) {
        let Some(index) = self.last_entry else {
            debug!("Dropping line without price or previous entry: {:?}", line);
            return;
        };

        let entry = &mut self.entries[index];
        if entry.category != category {
            debug!("Dropping line from another category: {:?}", line);
            return;
        }

        entry.description.push(' ');
        entry.description.push_str(line);
    }

    pub fn finish(self) -> Vec<MenuEntry> {
        self.entries
    }

    /// Run a fresh parser over the content rows of one image
    pub fn parse(rows: &[Row], image_name: &str, lexicon: &Lexicon) -> Vec<MenuEntry> {
        rows.iter()
            .fold(MenuParser::new(image_name, lexicon), |mut parser, row| {
                parser.parse_row(row);
                parser
            })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::Token;

    fn row(line: &str, category: &str) -> Row {
        let tokens = line
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| Token::from_rect(w, 0.9, i as f64 * 50.0, 0.0, 40.0, 10.0))
            .collect();
        let mut row = Row::new(tokens);
        row.set_category(category);
        row
    }

    fn items(entries: &[MenuEntry]) -> Vec<(&str, &str)> {
        entries
            .iter()
            .map(|e| (e.item.as_str(), e.price.as_str()))
            .collect()
    }

    #[test]
    fn test_item_and_price_pairs() {
        let lexicon = Lexicon::default();
        let rows = vec![
            row("Paneer Tikka 180", "STARTERS"),
            row("Veg Spring Roll 150", "STARTERS"),
        ];

        let entries = MenuParser::parse(&rows, "menu.jpg", &lexicon);
        assert_eq!(
            entries,
            vec![
                MenuEntry {
                    image: "menu.jpg".to_string(),
                    category: "STARTERS".to_string(),
                    item: "Paneer Tikka".to_string(),
                    price: "180".to_string(),
                    description: String::new(),
                },
                MenuEntry {
                    image: "menu.jpg".to_string(),
                    category: "STARTERS".to_string(),
                    item: "Veg Spring Roll".to_string(),
                    price: "150".to_string(),
                    description: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_description_appended_to_previous_entry() {
        let lexicon = Lexicon::default();
        let rows = vec![
            row("Masala Dosa 90", "DOSA"),
            row("Served with sambar and chutney", "DOSA"),
        ];

        let entries = MenuParser::parse(&rows, "menu.jpg", &lexicon);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, " Served with sambar and chutney");
    }

    #[test]
    fn test_descriptions_accumulate() {
        let lexicon = Lexicon::default();
        let rows = vec![
            row("Thali 250", "MEALS"),
            row("Two curries and rice", "MEALS"),
            row("with papad", "MEALS"),
        ];

        let entries = MenuParser::parse(&rows, "menu.jpg", &lexicon);
        assert_eq!(entries[0].description, " Two curries and rice with papad");
    }

    #[test]
    fn test_description_dropped_across_categories() {
        let lexicon = Lexicon::default();
        let rows = vec![
            row("Masala Dosa 90", "DOSA"),
            row("Served chilled", "DRINKS"),
        ];

        let entries = MenuParser::parse(&rows, "menu.jpg", &lexicon);
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn test_priceless_line_without_entry_is_dropped() {
        let lexicon = Lexicon::default();
        let entries = MenuParser::parse(&[row("Open all days", "Uncategorized")], "m", &lexicon);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_size_variants_each_get_a_price() {
        let lexicon = Lexicon::default();
        let pairs = pair_items_with_prices("Small 120 Large 180", &lexicon);
        assert_eq!(
            pairs,
            vec![
                ("Small".to_string(), "120".to_string()),
                ("Large".to_string(), "180".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_chunk_before_first_price_creates_nothing() {
        let lexicon = Lexicon::default();
        let pairs = pair_items_with_prices("120 Large 180", &lexicon);
        assert_eq!(pairs, vec![("Large".to_string(), "180".to_string())]);
    }

    #[test]
    fn test_trailing_text_after_last_price_ignored() {
        let lexicon = Lexicon::default();
        let pairs = pair_items_with_prices("Lassi 60 Sweet or Salted", &lexicon);
        assert_eq!(pairs, vec![("Lassi".to_string(), "60".to_string())]);
    }

    #[test]
    fn test_multiple_names_share_price() {
        let lexicon = Lexicon::default();
        let entries = MenuParser::parse(&[row("Idli, Vada/Pongal - 60", "TIFFIN")], "m", &lexicon);
        assert_eq!(
            items(&entries),
            vec![("Idli", "60"), ("Vada", "60"), ("Pongal", "60")]
        );
    }

    #[test]
    fn test_parentheticals_and_noise_removed() {
        let lexicon = Lexicon::default();
        let entries = MenuParser::parse(
            &[row("Biryani (Half) Rs. 140, Combo ₹ 220", "RICE")],
            "m",
            &lexicon,
        );
        assert_eq!(items(&entries), vec![("Biryani", "Rs. 140")]);
    }

    #[test]
    fn test_description_goes_to_last_entry_of_row() {
        let lexicon = Lexicon::default();
        let rows = vec![
            row("Tea 20 Coffee 30", "HOT"),
            row("Freshly brewed", "HOT"),
        ];

        let entries = MenuParser::parse(&rows, "m", &lexicon);
        assert_eq!(entries[0].description, "");
        assert_eq!(entries[1].description, " Freshly brewed");
    }

    #[test]
    fn test_price_row_without_valid_item_keeps_previous_entry() {
        let lexicon = Lexicon::default();
        let rows = vec![
            row("Kulfi 80", "SWEETS"),
            row("AM 10", "SWEETS"),
            row("Saffron and pistachio", "SWEETS"),
        ];

        let entries = MenuParser::parse(&rows, "m", &lexicon);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, " Saffron and pistachio");
    }

    #[test]
    fn test_rows_without_category_use_uncategorized() {
        let lexicon = Lexicon::default();
        let tokens = vec![
            Token::from_rect("Samosa", 0.9, 0.0, 0.0, 40.0, 10.0),
            Token::from_rect("25", 0.9, 60.0, 0.0, 20.0, 10.0),
        ];
        let entries = MenuParser::parse(&[Row::new(tokens)], "m", &lexicon);
        assert_eq!(entries[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_entry_serializes_with_fixed_fields() {
        let entry = MenuEntry {
            image: "a.png".to_string(),
            category: "SOUPS".to_string(),
            item: "Tomato Soup".to_string(),
            price: "₹ 90".to_string(),
            description: " hot".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["item"], "Tomato Soup");
        assert_eq!(json["price"], "₹ 90");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
