//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `wordle_people_core` linkage.
//! - Run a demo import or count query against a database file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wordle_people_core::db::open_db;
use wordle_people_core::{
    BundledWordSource, Color, FileWordSource, FilterEngine, Gender, ImportConfig, PeopleService,
    SqlitePersonRepository, WordSource, DEFAULT_BATCH_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = "wordle-people", version, about = "Wordle People core smoke tool")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print ping and version (default).
    Ping,
    /// Generate random people into a database file.
    Import {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value_t = 1000)]
        count: u64,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Newline-delimited word list; the bundled list is used when absent.
        #[arg(long)]
        wordlist: Option<PathBuf>,
    },
    /// Print filtered and total counts.
    Counts {
        #[arg(long)]
        db: PathBuf,
        #[arg(long = "color")]
        colors: Vec<Color>,
        #[arg(long = "gender")]
        genders: Vec<Gender>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Command::Ping) {
        Command::Ping => {
            println!("wordle_people_core ping={}", wordle_people_core::ping());
            println!(
                "wordle_people_core version={}",
                wordle_people_core::core_version()
            );
            Ok(())
        }
        Command::Import {
            db,
            count,
            batch_size,
            wordlist,
        } => run_import(db, count, batch_size, wordlist),
        Command::Counts {
            db,
            colors,
            genders,
        } => run_counts(db, colors, genders),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_import(
    db: PathBuf,
    count: u64,
    batch_size: usize,
    wordlist: Option<PathBuf>,
) -> Result<(), String> {
    let config = ImportConfig::new(count, batch_size).map_err(|err| err.to_string())?;
    let conn = open_db(&db).map_err(|err| err.to_string())?;
    let repo = SqlitePersonRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = PeopleService::new(repo);

    let word_source: Box<dyn WordSource> = match wordlist {
        Some(path) => Box::new(FileWordSource::new(path)),
        None => Box::new(BundledWordSource),
    };

    for item in service.import(word_source.as_ref(), config) {
        let progress = item.map_err(|err| err.to_string())?;
        println!("{progress}");
    }
    Ok(())
}

fn run_counts(db: PathBuf, colors: Vec<Color>, genders: Vec<Gender>) -> Result<(), String> {
    let conn = open_db(&db).map_err(|err| err.to_string())?;
    let repo = SqlitePersonRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = PeopleService::new(repo);

    let mut engine = FilterEngine::new();
    for color in colors {
        engine.toggle_color(color, true);
    }
    for gender in genders {
        engine.toggle_gender(gender, true);
    }

    let counts = service
        .counts(&engine.current_selector())
        .map_err(|err| err.to_string())?;
    println!("{}", counts.title());
    Ok(())
}
