//! Layout Analysis
//!
//! Reconstructs menu structure from unordered word tokens:
//! rows, section headers, item/price pairs and descriptions.

pub mod categories;
pub mod filter;
pub mod menu;
pub mod patterns;
pub mod rows;

pub use categories::{CategoryAssigner, UNCATEGORIZED};
pub use filter::filter_entries;
pub use menu::{MenuEntry, MenuParser};
pub use patterns::Lexicon;
pub use rows::group_rows;
