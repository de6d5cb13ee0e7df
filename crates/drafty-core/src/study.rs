//! Flashcard study sessions
//!
//! Cycles through a list of cards in order, one side at a time. There is
//! no scheduling: `next` always advances by one and wraps at the end.

use crate::models::Flashcard;

/// Cursor over a borrowed list of flashcards
#[derive(Debug, Clone)]
pub struct StudyCycler<'a> {
    cards: Vec<&'a Flashcard>,
    index: usize,
    show_answer: bool,
}

impl<'a> StudyCycler<'a> {
    pub fn new(cards: &'a [Flashcard]) -> Self {
        Self::from_refs(cards.iter().collect())
    }

    /// Build from an already filtered list
    pub fn from_refs(cards: Vec<&'a Flashcard>) -> Self {
        Self {
            cards,
            index: 0,
            show_answer: false,
        }
    }

    /// The card being studied, or `None` when there are no cards
    pub fn current(&self) -> Option<&'a Flashcard> {
        self.cards.get(self.index).copied()
    }

    /// Advance to the next card, wrapping around, and hide the answer
    pub fn next(&mut self) -> Option<&'a Flashcard> {
        if !self.cards.is_empty() {
            self.index = (self.index + 1) % self.cards.len();
        }
        self.show_answer = false;
        self.current()
    }

    /// Flip between question and answer
    pub fn toggle_answer(&mut self) -> bool {
        self.show_answer = !self.show_answer;
        self.show_answer
    }

    pub fn answer_visible(&self) -> bool {
        self.show_answer
    }

    /// Zero-based position of the current card
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cards(n: usize) -> Vec<Flashcard> {
        (0..n)
            .map(|i| Flashcard::new(format!("Q{}", i), format!("A{}", i), None, Utc::now()))
            .collect()
    }

    #[test]
    fn test_wraps_around() {
        let cards = cards(3);
        let mut cycler = StudyCycler::new(&cards);

        assert_eq!(cycler.current().unwrap().front, "Q0");
        cycler.toggle_answer();
        assert!(cycler.answer_visible());

        assert_eq!(cycler.next().unwrap().front, "Q1");
        assert!(!cycler.answer_visible());
        cycler.next();
        assert_eq!(cycler.index(), 2);

        assert_eq!(cycler.next().unwrap().front, "Q0");
        assert_eq!(cycler.index(), 0);
        assert!(!cycler.answer_visible());
    }

    #[test]
    fn test_toggle_answer() {
        let cards = cards(1);
        let mut cycler = StudyCycler::new(&cards);
        assert!(cycler.toggle_answer());
        assert!(!cycler.toggle_answer());

        // A single card wraps to itself
        cycler.toggle_answer();
        assert_eq!(cycler.next().unwrap().front, "Q0");
        assert!(!cycler.answer_visible());
    }

    #[test]
    fn test_empty() {
        let mut cycler = StudyCycler::new(&[]);
        assert!(cycler.is_empty());
        assert!(cycler.current().is_none());
        assert!(cycler.next().is_none());
        assert_eq!(cycler.index(), 0);
    }
}
