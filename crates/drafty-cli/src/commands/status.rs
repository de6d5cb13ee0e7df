//! Status command handler

use anyhow::Result;

use drafty_core::Config;

use super::FileWorkspace;
use crate::output::{Output, OutputFormat};

/// Show session, content counts and storage usage
pub fn show(workspace: &FileWorkspace, config: &Config, output: &Output) -> Result<()> {
    let collections = workspace.collections();
    let pages: usize = collections.books.iter().map(|b| b.pages.len()).sum();
    // Only available with a session
    let stats = workspace.stats().ok();

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "session": workspace.session(),
                "data_dir": config.data_dir,
                "counts": {
                    "books": collections.books.len(),
                    "pages": pages,
                    "projects": collections.projects.len(),
                    "flashcards": collections.flashcards.len()
                },
                "storage": stats.as_ref().map(|s| serde_json::json!({
                    "keys": s.keys,
                    "total_size": s.total_size()
                }))
            }));
        }
        OutputFormat::Quiet => {
            if let Ok(uid) = workspace.uid() {
                println!("{}", uid);
            }
        }
        OutputFormat::Human => {
            println!("Drafty Status");
            println!("=============");
            println!();
            println!("Session:");
            match workspace.session() {
                Some(session) => {
                    println!("  User: {}", session.display_name());
                    println!("  UID:  {}", session.uid);
                }
                None => println!("  Not signed in (drafty login <uid>)"),
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            if let Some(stats) = &stats {
                println!("  Size:     {}", stats.total_size_human());
            }
            println!();
            println!("Contents:");
            println!("  Notebooks:  {}", collections.books.len());
            println!("  Pages:      {}", pages);
            println!("  Projects:   {}", collections.projects.len());
            println!("  Flashcards: {}", collections.flashcards.len());
        }
    }

    Ok(())
}
