use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::hard_words::{HardWords, KeyValueStore};
use crate::model::{Part, Word};

pub const DIFFICULT_TITLE: &str = "Hard words";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Study,
    Difficult,
}

/// What the learner is looking at: a view, and in study views a deck of
/// cards with a cursor.
#[derive(Debug, Clone)]
pub struct StudySession {
    view: View,
    title: String,
    words: Vec<Word>,
    index: usize,
}

impl Default for StudySession {
    fn default() -> Self {
        Self {
            view: View::Home,
            title: String::new(),
            words: Vec::new(),
            index: 0,
        }
    }
}

impl StudySession {
    pub fn start_part(part: &Part) -> Self {
        Self {
            view: View::Study,
            title: part.name.clone(),
            words: part.words.clone(),
            index: 0,
        }
    }

    /// A deck of every hard word. `None` when nothing is marked.
    pub fn start_difficult<S: KeyValueStore>(parts: &[Part], hard: &HardWords<S>) -> Option<Self> {
        let words: Vec<Word> = hard.collect(parts).into_iter().cloned().collect();
        if words.is_empty() {
            return None;
        }
        Some(Self {
            view: View::Difficult,
            title: DIFFICULT_TITLE.to_string(),
            words,
            index: 0,
        })
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.words.shuffle(rng);
        self.index = 0;
    }

    pub fn go_home(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.index)
    }

    /// 1-based position for display, e.g. `(3, 20)`.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.words.len())
    }

    /// Advances unless already on the last card. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.words.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// "I knew it": clears the hard mark on the current word and moves on.
    ///
    /// On the last card the mark still changes but the cursor stays put.
    /// Returns whether the cursor moved.
    pub fn mark_known<S: KeyValueStore>(&mut self, hard: &mut HardWords<S>) -> Result<bool> {
        self.grade(hard, false)
    }

    /// "I struggled": marks the current word as hard and moves on.
    pub fn mark_hard<S: KeyValueStore>(&mut self, hard: &mut HardWords<S>) -> Result<bool> {
        self.grade(hard, true)
    }

    fn grade<S: KeyValueStore>(&mut self, hard: &mut HardWords<S>, is_hard: bool) -> Result<bool> {
        let Some(word) = self.current() else {
            return Ok(false);
        };
        if hard.contains(&word.id) != is_hard {
            hard.toggle(&word.id)?;
        }
        Ok(self.next())
    }
}
