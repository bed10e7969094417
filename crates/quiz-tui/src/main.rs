mod app;
mod palette;
mod render;

use app::{App, AppAction, AppContext, Tone};
use clap::Parser;
use quiz_core::{
    create_key_value, user_id, CatalogCache, CatalogSource, Clock, Difficulty, JsonCatalogSource,
    KvQuizStore, QuizConfig, ShareLink, SystemClock,
};
use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "country-quiz", version, about = "Guess the country from its clues")]
struct Args {
    /// Difficulty tier: easy, medium or hard (defaults to your last choice)
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Seed for a reproducible game
    #[arg(short, long)]
    seed: Option<u64>,

    /// Replay a shared game, e.g. "?seed=42&difficulty=hard" or a full link
    #[arg(long, conflicts_with_all = ["difficulty", "seed"])]
    share: Option<ShareLink>,

    /// Country catalog JSON to use instead of the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory for saved data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print statistics and exit
    #[arg(long)]
    stats: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = QuizConfig::from_env();
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir;
    }

    let kv = create_key_value(&config);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source: Arc<dyn CatalogSource> = match args.catalog {
        Some(path) => Arc::new(JsonCatalogSource::File(path)),
        None => Arc::new(JsonCatalogSource::bundled()),
    };
    let catalog = CatalogCache::new(source, Arc::clone(&kv), &config).load(clock.now_ms())?;

    let ctx = AppContext {
        user_id: user_id(kv.as_ref()),
        store: Arc::new(KvQuizStore::from_config(kv, &config)),
        config,
        catalog,
        clock,
    };
    let mut app = App::new(ctx)?;

    if args.stats {
        app.handle_line("stats");
        render::render(&mut io::stdout(), &app)?;
        println!();
        app.shutdown();
        return Ok(());
    }

    let (difficulty, seed) = match args.share {
        Some(link) => (link.difficulty, Some(link.seed)),
        None => (
            args.difficulty.unwrap_or_else(|| app.preferred_difficulty()),
            args.seed,
        ),
    };
    app.start(difficulty, seed)?;
    if args.share.is_some() {
        app.show(Tone::Info, format!("Replaying a shared {difficulty} game."));
    }

    let mut stdout = io::stdout();
    render::render(&mut stdout, &app)?;
    for line in io::stdin().lock().lines() {
        if let AppAction::Quit = app.handle_line(&line?) {
            break;
        }
        render::render(&mut stdout, &app)?;
    }

    app.shutdown();
    println!();
    Ok(())
}
