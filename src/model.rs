use serde::{Deserialize, Serialize};

/// One vocabulary entry: a source-language term and its target-language form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub source_text: String,
    pub target_text: String,
    pub part_name: String,
}

/// A named lesson, holding its words in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub words: Vec<Word>,
}

impl Part {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            words: Vec::new(),
        }
    }
}

/// Which half of a header pair a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// A single header column tagged with the part it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub index: usize,
    pub part_name: String,
    pub side: Side,
}

/// Home-screen counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub parts: usize,
    pub words: usize,
    pub hard_words: usize,
}

impl Stats {
    pub fn collect(parts: &[Part], hard_words: usize) -> Self {
        Self {
            parts: parts.len(),
            words: parts.iter().map(|p| p.words.len()).sum(),
            hard_words,
        }
    }
}
