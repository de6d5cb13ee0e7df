//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use drafty_core::{Book, Flashcard, Page, Project, StorageError, WorkspaceError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any serializable value as pretty JSON
    pub fn json(&self, value: &impl Serialize) {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format output: {}", e),
        }
    }

    /// Print a single book with its pages
    pub fn print_book(&self, book: &Book, flashcard_count: usize) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", book.id);
                println!("Name:        {}", book.name);
                println!("Pages:       {}", book.pages.len());
                println!("Flashcards:  {}", flashcard_count);
                println!("Created:     {}", book.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", book.updated_at.format("%Y-%m-%d %H:%M"));

                if !book.pages.is_empty() {
                    println!();
                    println!("── Pages ({}) ──", book.pages.len());
                    for (i, page) in book.pages.iter().enumerate() {
                        println!(
                            "{:>3}. {} | {}",
                            i + 1,
                            truncate(&page.name, 30),
                            truncate_line(&plain_text(&page.content), 50)
                        );
                    }
                }
            }
            OutputFormat::Json => self.json(book),
            OutputFormat::Quiet => println!("{}", book.id),
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for (i, book) in books.iter().enumerate() {
                    println!(
                        "{:>3}. {} | {} | {} page(s) | {}",
                        i + 1,
                        short_id(&book.id),
                        truncate(&book.name, 35),
                        book.pages.len(),
                        book.updated_at.format("%Y-%m-%d")
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => self.json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a single page including its content
    pub fn print_page(&self, book: &Book, page: &Page) {
        match self.format {
            OutputFormat::Human => {
                println!("Book:    {}", book.name);
                println!("Page:    {}", page.name);
                println!("ID:      {}", page.id);
                println!("Updated: {}", page.updated_at.format("%Y-%m-%d %H:%M"));
                println!("────────────────────────────────────────");
                println!("{}", page.content);
            }
            OutputFormat::Json => self.json(page),
            OutputFormat::Quiet => println!("{}", page.content),
        }
    }

    /// Print the pages of a book
    pub fn print_pages(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("Pages in: {}", book.name);
                println!();
                if book.pages.is_empty() {
                    println!("No pages in this book.");
                    return;
                }
                for (i, page) in book.pages.iter().enumerate() {
                    println!(
                        "{:>3}. {} | {} | {}",
                        i + 1,
                        short_id(&page.id),
                        truncate(&page.name, 35),
                        page.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
                println!("\n{} page(s)", book.pages.len());
            }
            OutputFormat::Json => self.json(&book.pages),
            OutputFormat::Quiet => {
                for page in &book.pages {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print a project and the books it resolves to
    pub fn print_project(&self, project: &Project, books: &[&Book]) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", project.id);
                println!("Name:     {}", project.name);
                println!("Created:  {}", project.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", project.updated_at.format("%Y-%m-%d %H:%M"));
                println!();
                if books.is_empty() {
                    println!("No notebooks in this project.");
                    return;
                }
                println!("── Notebooks ({}) ──", books.len());
                for book in books {
                    println!("  {} | {}", short_id(&book.id), book.name);
                }
            }
            OutputFormat::Json => self.json(&serde_json::json!({
                "project": project,
                "books": books,
            })),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a list of projects
    pub fn print_projects(&self, projects: &[Project]) {
        match self.format {
            OutputFormat::Human => {
                if projects.is_empty() {
                    println!("No projects found.");
                    return;
                }
                for (i, project) in projects.iter().enumerate() {
                    let count = project.book_ids.len();
                    println!(
                        "{:>3}. {} | {} | {} notebook{} | {}",
                        i + 1,
                        short_id(&project.id),
                        truncate(&project.name, 35),
                        count,
                        if count == 1 { "" } else { "s" },
                        project.updated_at.format("%Y-%m-%d")
                    );
                }
                println!("\n{} project(s)", projects.len());
            }
            OutputFormat::Json => self.json(&projects),
            OutputFormat::Quiet => {
                for project in projects {
                    println!("{}", project.id);
                }
            }
        }
    }

    /// Print a list of flashcards
    pub fn print_cards(&self, cards: &[&Flashcard]) {
        match self.format {
            OutputFormat::Human => {
                if cards.is_empty() {
                    println!("No flashcards yet.");
                    return;
                }
                for (i, card) in cards.iter().enumerate() {
                    println!(
                        "{:>3}. {} | {} → {}",
                        i + 1,
                        short_id(&card.id),
                        truncate_line(&card.front, 35),
                        truncate_line(&card.back, 35)
                    );
                }
                println!("\n{} card(s)", cards.len());
            }
            OutputFormat::Json => self.json(&cards),
            OutputFormat::Quiet => {
                for card in cards {
                    println!("{}", card.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// The first recovery suggestion found in an error chain
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<WorkspaceError>() {
            e.recovery_suggestion()
        } else {
            cause
                .downcast_ref::<StorageError>()
                .and_then(StorageError::recovery_suggestion)
        }
    })
}

/// Print a failed command's error and any recovery hint to stderr
pub fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);
    if let Some(hint) = recovery_hint(err) {
        eprintln!("Hint: {}", hint);
    }
}

/// Shortened ID for list views
///
/// Generated IDs share a time-based prefix, so the tail is shown.
pub fn short_id(id: &str) -> &str {
    let count = id.chars().count();
    if count <= 13 {
        return id;
    }
    let start = id
        .char_indices()
        .nth(count - 8)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &id[start..]
}

/// Truncate a string to max length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
pub fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

/// Strip markup tags from rich page content for previews
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("1700000000000"), "1700000000000");
        assert_eq!(
            short_id("01900000-0000-7000-8000-0123456789ab"),
            "456789ab"
        );
    }

    #[test]
    fn test_recovery_hint_through_context() {
        use anyhow::Context;
        use drafty_core::SessionError;

        let err = Err::<(), _>(WorkspaceError::from(SessionError::NoSession))
            .context("Failed to create book")
            .unwrap_err();
        assert!(recovery_hint(&err).unwrap().contains("drafty login"));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = anyhow::Error::new(StorageError::from_io(io_err, "/data".into()))
            .context("Failed to open data");
        assert!(recovery_hint(&err).unwrap().contains("permissions"));

        assert_eq!(recovery_hint(&anyhow::anyhow!("plain failure")), None);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("<p>cells <b>divide</b></p>"), "cells divide");
        assert_eq!(plain_text("no markup"), "no markup");
    }
}
