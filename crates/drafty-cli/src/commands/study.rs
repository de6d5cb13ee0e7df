//! Study command handler
//!
//! Walks through flashcards one at a time on the terminal:
//! Enter flips the card, `n` moves on, `q` stops.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use drafty_core::{Flashcard, StudyCycler};

use super::card::filter_for;
use super::FileWorkspace;
use crate::output::Output;

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Flip,
    Next,
    Quit,
}

fn parse_action(input: &str) -> Option<Action> {
    match input.trim().to_lowercase().as_str() {
        "" | "f" | "flip" => Some(Action::Flip),
        "n" | "next" => Some(Action::Next),
        "q" | "quit" | "exit" => Some(Action::Quit),
        _ => None,
    }
}

/// Run an interactive study session
pub fn run(workspace: &FileWorkspace, book: Option<String>, output: &Output) -> Result<()> {
    let collections = workspace.collections();
    let filter = filter_for(collections, book.as_deref())?;
    let cards = collections.flashcards_for(&filter);

    if !output.should_prompt() {
        output.print_cards(&cards);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut cycler = StudyCycler::from_refs(cards);
    study_loop(&mut cycler, || lines.next().transpose())?;
    Ok(())
}

/// Drive the cycler from a source of input lines until quit or end of input
fn study_loop<F>(cycler: &mut StudyCycler<'_>, mut next_line: F) -> io::Result<usize>
where
    F: FnMut() -> io::Result<Option<String>>,
{
    if cycler.is_empty() {
        println!("No flashcards to study. Add some with: drafty card add");
        return Ok(0);
    }

    let mut seen = 1;
    loop {
        if let Some(card) = cycler.current() {
            show_card(card, cycler.index(), cycler.len(), cycler.answer_visible());
        }
        print!("[Enter] flip  [n] next  [q] quit > ");
        io::stdout().flush()?;

        let Some(line) = next_line()? else {
            println!();
            break;
        };
        match parse_action(&line) {
            Some(Action::Flip) => {
                cycler.toggle_answer();
            }
            Some(Action::Next) => {
                cycler.next();
                seen += 1;
            }
            Some(Action::Quit) => break,
            None => println!("Unknown command: {}", line.trim()),
        }
    }
    Ok(seen)
}

fn show_card(card: &Flashcard, index: usize, total: usize, answer_visible: bool) {
    println!();
    println!("── Card {} of {} ──", index + 1, total);
    if answer_visible {
        println!("A: {}", card.back);
    } else {
        println!("Q: {}", card.front);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action(""), Some(Action::Flip));
        assert_eq!(parse_action(" N "), Some(Action::Next));
        assert_eq!(parse_action("q"), Some(Action::Quit));
        assert_eq!(parse_action("huh"), None);
    }

    #[test]
    fn test_study_loop_follows_input() {
        let cards: Vec<Flashcard> = (0..2)
            .map(|i| Flashcard::new(format!("Q{}", i), format!("A{}", i), None, Utc::now()))
            .collect();
        let mut cycler = StudyCycler::new(&cards);
        let mut input = vec!["", "n", "n", "q"].into_iter().map(str::to_string);

        let seen = study_loop(&mut cycler, || Ok(input.next())).unwrap();
        assert_eq!(seen, 3);
        // Wrapped back to the first card
        assert_eq!(cycler.index(), 0);
        assert!(!cycler.answer_visible());
    }

    #[test]
    fn test_study_loop_stops_at_end_of_input() {
        let cards = vec![Flashcard::new("Q", "A", None, Utc::now())];
        let mut cycler = StudyCycler::new(&cards);
        let seen = study_loop(&mut cycler, || Ok(None)).unwrap();
        assert_eq!(seen, 1);
    }
}
