//! LinguaFlow: flashcards for vocabulary kept in a published spreadsheet.
//!
//! The sheet's header names the parts (lessons) in column pairs; see
//! [`parser`] for the layout. [`source::load_parts`] fetches and parses it.

pub mod ai;
pub mod config;
pub mod error;
pub mod hard_words;
pub mod model;
pub mod parser;
pub mod session;
pub mod source;

pub use error::{LinguaError, Result};
pub use model::{Part, Stats, Word};
pub use parser::{parse_words, tokenize_line};
pub use source::{load_parts, WordSource};
