//! Drafty CLI
//!
//! Command-line interface for Drafty - notebooks, projects and flashcards.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use drafty_core::{CollectionKind, ThemeMode, Workspace};

mod commands;
mod editor;
mod logging;
mod output;

use commands::project::Membership;
use commands::FileWorkspace;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "drafty")]
#[command(about = "Drafty - notebooks, projects and flashcards")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Act as this user for a single command
    #[arg(long, global = true)]
    uid: Option<String>,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage notebooks
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage pages in a notebook
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage flashcards
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },
    /// Study flashcards one at a time
    Study {
        /// Only cards for this notebook ("all" for every card)
        #[arg(short, long)]
        book: Option<String>,
    },
    /// Show or replace the whiteboard image
    Whiteboard {
        #[command(subcommand)]
        command: Option<WhiteboardCommands>,
    },
    /// Export, import or clear stored collections
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
    /// Show or change display preferences
    Prefs {
        #[command(subcommand)]
        command: Option<PrefsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Sign in as a user
    Login {
        /// User ID
        #[arg(value_name = "UID")]
        user_id: String,
        /// Email shown for the session
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show session, counts and storage usage
    Status,
}

#[derive(Subcommand)]
enum BookCommands {
    /// Create a new notebook
    #[command(visible_alias = "new")]
    Create {
        /// Name (defaults to "Untitled Book")
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List all notebooks
    #[command(alias = "ls")]
    List,
    /// Show a notebook and its pages
    Show {
        /// Notebook ID, position, or ID prefix/suffix
        id: String,
    },
    /// Rename a notebook
    Rename { id: String, name: String },
    /// Delete a notebook, its pages and its flashcards
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand)]
enum PageCommands {
    /// Add a page to a notebook
    #[command(visible_alias = "new")]
    Create {
        book: String,
        /// Name (defaults to "Untitled Page")
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List pages in a notebook
    #[command(alias = "ls")]
    List { book: String },
    /// Show a page
    Show { book: String, page: String },
    /// Edit page content (opens $EDITOR if --content is not given)
    Edit {
        book: String,
        page: String,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Rename a page
    Rename {
        book: String,
        page: String,
        name: String,
    },
    /// Delete a page
    #[command(alias = "rm")]
    Delete { book: String, page: String },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a new project
    #[command(visible_alias = "new")]
    Create {
        /// Name (defaults to "Untitled Project")
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List all projects
    #[command(alias = "ls")]
    List,
    /// Show a project and its notebooks
    Show { id: String },
    /// Rename a project
    Rename { id: String, name: String },
    /// Add a notebook to a project
    Add { project: String, book: String },
    /// Remove a notebook from a project (the notebook is kept)
    Remove { project: String, book: String },
    /// Add the notebook if absent, remove it if present
    Toggle { project: String, book: String },
    /// Delete a project (its notebooks are kept)
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand)]
enum CardCommands {
    /// Add a flashcard
    #[command(alias = "create")]
    Add {
        front: String,
        back: String,
        /// Attach the card to a notebook
        #[arg(short, long)]
        book: Option<String>,
    },
    /// List flashcards
    #[command(alias = "ls")]
    List {
        /// Only cards for this notebook ("all" for every card)
        #[arg(short, long)]
        book: Option<String>,
    },
    /// Delete a flashcard
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand)]
enum WhiteboardCommands {
    /// Describe the whiteboard, or save its image
    Show {
        /// Write the decoded image to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace the whiteboard with an image file
    Set { file: PathBuf },
    /// Erase the whiteboard
    Clear,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Export a collection as JSON
    Export {
        /// books, projects, flashcards or whiteboard
        kind: CollectionKind,
        /// Output file or directory (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// Replace a collection with the contents of a JSON file
    Import { kind: CollectionKind, file: PathBuf },
    /// Delete a stored collection
    Clear { kind: CollectionKind },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Show the active theme
    Show,
    /// List available themes
    #[command(alias = "ls")]
    List,
    /// Switch theme
    Set { name: String },
    /// Switch between dark and light mode
    Mode { mode: ThemeMode },
    /// Set the accent color (omit to reset to the theme default)
    Accent { color: Option<String> },
    /// Print the theme as CSS variables
    Css {
        /// Theme to render instead of the active one
        #[arg(short, long)]
        theme: Option<String>,
        /// Mode to render instead of the active one
        #[arg(short, long)]
        mode: Option<ThemeMode>,
    },
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show all preferences
    Show,
    /// Set a preference
    Set {
        /// theme, theme-mode, accent, text-color, font-size, font-family or demo-mode
        key: String,
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, uid, email, log_file)
        key: String,
        /// Configuration value ("none" or empty to unset)
        value: String,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Log before any command runs, including those that rewrite the config
    let loaded = logging::init_from_config_path(config_path);

    // Commands that manage the config file itself
    match &cli.command {
        Some(Commands::Config { command }) => {
            return handle_config_command(command.clone(), config_path, &output);
        }
        Some(Commands::Login { user_id, email }) => {
            return commands::session::login(user_id.clone(), email.clone(), config_path, &output);
        }
        Some(Commands::Logout) => return commands::session::logout(config_path, &output),
        _ => {}
    }

    let mut config = loaded.context("Failed to load configuration")?;
    if let Some(uid) = cli.uid {
        config.uid = Some(uid);
        config.email = None;
    }

    let mut workspace = Workspace::open_with_config(&config).context("Failed to open data")?;

    let Some(command) = cli.command else {
        return commands::status::show(&workspace, &config, &output);
    };

    let needs_session = matches!(
        command,
        Commands::Book { .. }
            | Commands::Page { .. }
            | Commands::Project { .. }
            | Commands::Card { .. }
            | Commands::Study { .. }
            | Commands::Whiteboard { .. }
            | Commands::Data { .. }
    );
    if needs_session {
        workspace.uid()?;
    }

    match command {
        Commands::Book { command } => handle_book_command(command, &mut workspace, &output),
        Commands::Page { command } => handle_page_command(command, &mut workspace, &output),
        Commands::Project { command } => handle_project_command(command, &mut workspace, &output),
        Commands::Card { command } => handle_card_command(command, &mut workspace, &output),
        Commands::Study { book } => commands::study::run(&workspace, book, &output),
        Commands::Whiteboard { command } => {
            handle_whiteboard_command(command, &mut workspace, &output)
        }
        Commands::Data { command } => handle_data_command(command, &mut workspace, &output),
        Commands::Theme { command } => handle_theme_command(command, &mut workspace, &output),
        Commands::Prefs { command } => match command {
            Some(PrefsCommands::Show) | None => commands::prefs::show(&workspace, &output),
            Some(PrefsCommands::Set { key, value }) => {
                commands::prefs::set(&mut workspace, key, value, &output)
            }
        },
        Commands::Whoami => commands::session::whoami(&config, &output),
        Commands::Status => commands::status::show(&workspace, &config, &output),
        Commands::Config { .. } | Commands::Login { .. } | Commands::Logout => Ok(()), // Handled above
    }
}

fn handle_book_command(
    command: BookCommands,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        BookCommands::Create { name } => commands::book::create(workspace, name, output),
        BookCommands::List => commands::book::list(workspace, output),
        BookCommands::Show { id } => commands::book::show(workspace, id, output),
        BookCommands::Rename { id, name } => commands::book::rename(workspace, id, name, output),
        BookCommands::Delete { id } => commands::book::delete(workspace, id, output),
    }
}

fn handle_page_command(
    command: PageCommands,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        PageCommands::Create { book, name } => commands::page::create(workspace, book, name, output),
        PageCommands::List { book } => commands::page::list(workspace, book, output),
        PageCommands::Show { book, page } => commands::page::show(workspace, book, page, output),
        PageCommands::Edit {
            book,
            page,
            content,
        } => commands::page::edit(workspace, book, page, content, output),
        PageCommands::Rename { book, page, name } => {
            commands::page::rename(workspace, book, page, name, output)
        }
        PageCommands::Delete { book, page } => commands::page::delete(workspace, book, page, output),
    }
}

fn handle_project_command(
    command: ProjectCommands,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        ProjectCommands::Create { name } => commands::project::create(workspace, name, output),
        ProjectCommands::List => commands::project::list(workspace, output),
        ProjectCommands::Show { id } => commands::project::show(workspace, id, output),
        ProjectCommands::Rename { id, name } => {
            commands::project::rename(workspace, id, name, output)
        }
        ProjectCommands::Add { project, book } => {
            commands::project::membership(workspace, project, book, Membership::Add, output)
        }
        ProjectCommands::Remove { project, book } => {
            commands::project::membership(workspace, project, book, Membership::Remove, output)
        }
        ProjectCommands::Toggle { project, book } => {
            commands::project::membership(workspace, project, book, Membership::Toggle, output)
        }
        ProjectCommands::Delete { id } => commands::project::delete(workspace, id, output),
    }
}

fn handle_card_command(
    command: CardCommands,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        CardCommands::Add { front, back, book } => {
            commands::card::add(workspace, front, back, book, output)
        }
        CardCommands::List { book } => commands::card::list(workspace, book, output),
        CardCommands::Delete { id } => commands::card::delete(workspace, id, output),
    }
}

fn handle_whiteboard_command(
    command: Option<WhiteboardCommands>,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        Some(WhiteboardCommands::Show { out }) => commands::whiteboard::show(workspace, out, output),
        None => commands::whiteboard::show(workspace, None, output),
        Some(WhiteboardCommands::Set { file }) => commands::whiteboard::set(workspace, file, output),
        Some(WhiteboardCommands::Clear) => commands::whiteboard::clear(workspace, output),
    }
}

fn handle_data_command(
    command: DataCommands,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        DataCommands::Export {
            kind,
            output: out,
            stdout,
        } => commands::data::export(workspace, kind, out, stdout, output),
        DataCommands::Import { kind, file } => commands::data::import(workspace, kind, file, output),
        DataCommands::Clear { kind } => commands::data::clear(workspace, kind, output),
    }
}

fn handle_theme_command(
    command: Option<ThemeCommands>,
    workspace: &mut FileWorkspace,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ThemeCommands::Show) | None => commands::theme::show(workspace, output),
        Some(ThemeCommands::List) => commands::theme::list(workspace, output),
        Some(ThemeCommands::Set { name }) => commands::theme::set(workspace, name, output),
        Some(ThemeCommands::Mode { mode }) => commands::theme::mode(workspace, mode, output),
        Some(ThemeCommands::Accent { color }) => commands::theme::accent(workspace, color, output),
        Some(ThemeCommands::Css { theme, mode }) => commands::theme::css(workspace, theme, mode),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
