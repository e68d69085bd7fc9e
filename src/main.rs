mod content;
mod db;
mod error;
mod flashcards;
mod models;
mod progress;
mod router;
mod session;
mod state;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use content::{ContentStore, SECTIONS};
use db::Database;
use models::{Difficulty, Fiche, JsonOutput, NewFlashcard};
use router::{Dashboard, SectionSummary};
use state::Study;

const DEFAULT_DB_NAME: &str = "fiches.db";

#[derive(Parser)]
#[command(name = "fiches")]
#[command(about = "Study companion for the French literature and philosophy programme")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a fiches JSON document (defaults to the bundled content)
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// List sections with their progress
    Sections,

    /// List the fiches of a section
    Fiches {
        /// Section key (e.g. connaissance-vie, methodologie, themes)
        section: String,
    },

    /// Show a fiche
    Fiche {
        /// Fiche ID
        id: String,
    },

    /// Mark a fiche as seen
    Seen {
        /// Section key
        section: String,

        /// Fiche ID
        fiche_id: String,
    },

    /// Manage flashcards
    #[command(subcommand)]
    Flashcard(FlashcardCommands),

    /// Show study statistics
    Stats,

    /// Erase all progress and flashcards
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum FlashcardCommands {
    /// Create a flashcard
    Add {
        /// Question
        question: String,

        /// Answer
        #[arg(long, short)]
        answer: String,

        /// Category
        #[arg(long, short)]
        category: String,

        /// Difficulty: easy/medium/hard
        #[arg(long, short, default_value = "medium")]
        difficulty: String,

        /// Book the card relates to
        #[arg(long, short)]
        book: Option<String>,
    },

    /// List flashcards
    List {
        /// Filter by book
        #[arg(long, short)]
        book: Option<String>,

        /// Filter by category
        #[arg(long, short)]
        category: Option<String>,

        /// Only the N most recent cards
        #[arg(long, short)]
        recent: Option<usize>,
    },
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("FICHES_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fiches");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn get_content_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var("FICHES_CONTENT").ok().map(PathBuf::from))
}

fn init_logging(debug: bool, tui: bool) {
    // The TUI owns the terminal; only log there when asked to
    if tui && !debug && std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug, matches!(cli.command, Commands::Tui));

    let json = cli.json;
    if let Err(e) = run(cli) {
        if json {
            if let Ok(out) = serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                println!("{}", out);
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    let db = Database::open(&db_path)?;
    db.init()?;

    if let Commands::Init = cli.command {
        if cli.json {
            println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
        } else {
            println!("Database initialized at: {}", db_path.display());
        }
        return Ok(());
    }

    let content = ContentStore::load(get_content_path(cli.content).as_deref())?;
    let mut study = Study::load(content, db)?;

    match cli.command {
        Commands::Init => {}

        Commands::Sections => {
            let sections: Vec<SectionSummary> = SECTIONS
                .iter()
                .filter_map(|s| {
                    study.progress(s.key).map(|progress| SectionSummary {
                        section: s,
                        progress,
                    })
                })
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&sections))?);
            } else {
                println!("{:<20} {:<36} PROGRESS", "KEY", "TITLE");
                println!("{}", "-".repeat(70));
                for s in sections {
                    println!(
                        "{:<20} {:<36} {}/{} ({}%)",
                        s.section.key,
                        truncate(s.section.title, 34),
                        s.progress.completed,
                        s.progress.total,
                        s.progress.percentage()
                    );
                }
            }
        }

        Commands::Fiches { section } => {
            let Some(progress) = study.progress(&section) else {
                return Err(error::StudyError::UnknownSection(section).into());
            };
            let fiches = study.content().fiches_for(&section);

            if cli.json {
                let rows: Vec<_> = fiches
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "id": f.id,
                            "title": f.title,
                            "type": f.fiche_type,
                            "seen": progress.has_seen(&f.id)
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string(&JsonOutput::ok(rows))?);
            } else if fiches.is_empty() {
                println!("No fiches in this section.");
            } else {
                println!("{:<4} {:<22} {:<44} TYPE", "", "ID", "TITLE");
                println!("{}", "-".repeat(80));
                for f in fiches {
                    let mark = if progress.has_seen(&f.id) { "[x]" } else { "[ ]" };
                    println!(
                        "{:<4} {:<22} {:<44} {}",
                        mark,
                        truncate(&f.id, 20),
                        truncate(&f.title, 42),
                        f.fiche_type.as_str()
                    );
                }
            }
        }

        Commands::Fiche { id } => {
            if let Some(fiche) = study.content().fiche(&id) {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(fiche))?);
                } else {
                    print_fiche(fiche, study.content().section_of(&id).map(|s| s.title));
                }
            } else if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::<()>::err("Fiche not found"))?
                );
            } else {
                println!("Fiche not found.");
            }
        }

        Commands::Seen { section, fiche_id } => {
            study.mark_fiche_seen(&section, &fiche_id)?;
            let progress = study.progress(&section).cloned().unwrap_or_default();

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&progress))?);
            } else {
                println!(
                    "Marked '{}' as seen ({}/{}, {}%).",
                    fiche_id,
                    progress.completed,
                    progress.total,
                    progress.percentage()
                );
            }
        }

        Commands::Flashcard(cmd) => match cmd {
            FlashcardCommands::Add {
                question,
                answer,
                category,
                difficulty,
                book,
            } => {
                let difficulty = Difficulty::from_str(&difficulty).ok_or_else(|| {
                    format!(
                        "Invalid difficulty '{}'. Use: easy, medium, or hard",
                        difficulty
                    )
                })?;

                let card = study.create_flashcard(NewFlashcard {
                    question,
                    answer,
                    category,
                    difficulty,
                    book,
                })?;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&card))?);
                } else {
                    println!(
                        "Added {} flashcard with ID: {}",
                        card.difficulty.as_str(),
                        card.id
                    );
                }
            }

            FlashcardCommands::List {
                book,
                category,
                recent,
            } => {
                let (book, category) = (book.as_deref(), category.as_deref());
                let cards = match recent {
                    Some(n) => flashcards::recent(study.data(), book, category, n),
                    None => flashcards::list(study.data(), book, category),
                };

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&cards))?);
                } else if cards.is_empty() {
                    println!("No flashcards found.");
                } else {
                    println!("{:<10} {:<44} {:<10} CATEGORY", "ID", "QUESTION", "LEVEL");
                    println!("{}", "-".repeat(90));
                    for card in cards {
                        println!(
                            "{:<10} {:<44} {:<10} {}",
                            truncate(&card.id, 8),
                            truncate(&card.question, 42),
                            card.difficulty.label(),
                            card.category
                        );
                    }
                }
            }
        },

        Commands::Stats => {
            let dash = Dashboard::build(study.data(), study.theme_progress());
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&dash))?);
            } else {
                println!("=== Study Statistics ===");
                println!(
                    "Overall progress: {}/{} fiches ({}%)",
                    dash.overview.completed, dash.overview.total, dash.overview.percentage
                );
                println!("Flashcards: {}", dash.flashcard_count);
                if let Some(date) = dash.last_card_date {
                    println!("Last flashcard: {}", date);
                }
                println!("Streak: {} day(s)", dash.streak_days);
                println!("Study time: {}h", dash.study_hours);

                if !dash.recent.is_empty() {
                    println!();
                    println!("--- Recent flashcards ---");
                    for card in &dash.recent {
                        println!("{}  {}", truncate(&card.id, 8), truncate(&card.question, 60));
                    }
                }
            }
        }

        Commands::Reset { yes } => {
            study.reset_all_progress(yes)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("All progress has been reset.");
            }
        }

        Commands::Tui => {
            tui::run(study)?;
        }
    }

    Ok(())
}

fn print_fiche(fiche: &Fiche, section: Option<&str>) {
    println!("{}", plain(&fiche.title));
    println!("ID: {}", fiche.id);
    if let Some(title) = section {
        println!("Section: {}", title);
    }
    if let Some(n) = fiche.fiche_numero {
        println!("Fiche no. {}", n);
    }
    if !fiche.summary.is_empty() {
        println!();
        println!("{}", plain(&fiche.summary));
    }
    if !fiche.concepts.is_empty() {
        println!();
        println!("Concepts: {}", fiche.concepts.join(", "));
    }

    println!();
    match &fiche.detailed_sections {
        Some(sections) if fiche.shows_sections() => {
            for s in sections {
                println!("--- {} ---", s.title);
                println!("{}", plain(&s.content));
                println!();
            }
        }
        _ => println!("{}", plain(&fiche.content)),
    }

    if !fiche.questions().is_empty() {
        println!();
        println!("--- Questions ---");
        for (i, q) in fiche.questions().iter().enumerate() {
            println!("{}. {}", i + 1, q);
        }
    }
}

// Drop **bold** markers for plain-text output
fn plain(s: &str) -> String {
    s.replace("**", "")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
