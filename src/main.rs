use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reflex::{
    app::{App, Control},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{ClickRegion, Config, ConfigStore, FileConfigStore},
    delay::RandomDelay,
    export::export_csv,
    game::Game,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    scores::ScoreStore,
    stats::{recent_history, Stats},
    storage::FileKeyValueStore,
};

/// reaction-time tui: wait for green, then click as fast as you can
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction-time game for the terminal. Click (or press space) to start, wait for the screen to turn green, then click as fast as you can. Results are kept across sessions."
)]
pub struct Cli {
    /// shortest delay before the go signal, in milliseconds
    #[clap(long = "min-delay")]
    min_delay_ms: Option<u64>,

    /// longest delay before the go signal, in milliseconds
    #[clap(long = "max-delay")]
    max_delay_ms: Option<u64>,

    /// number of recent results to show
    #[clap(short = 'n', long = "history")]
    history_len: Option<usize>,

    /// part of the terminal that accepts clicks
    #[clap(short = 'r', long, value_enum)]
    region: Option<ClickRegion>,

    /// score storage file (defaults to the platform state directory)
    #[clap(long)]
    storage: Option<PathBuf>,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// erase the stored score history and exit
    #[clap(long)]
    reset_scores: bool,

    /// write the score history as csv to the given path and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// print best/average/recent results and exit
    #[clap(long)]
    print_stats: bool,
}

impl Cli {
    /// Command line flags take precedence over the stored config
    fn apply(&self, cfg: &mut Config) {
        if let Some(ms) = self.min_delay_ms {
            cfg.min_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            cfg.max_delay_ms = ms;
        }
        if let Some(n) = self.history_len {
            cfg.history_len = n;
        }
        if let Some(region) = self.region {
            cfg.click_region = region;
        }
        if let Some(path) = &self.storage {
            cfg.storage_path = Some(path.clone());
        }
    }

    fn is_one_shot(&self) -> bool {
        self.reset_scores || self.export.is_some() || self.print_stats
    }
}

fn storage_path(cfg: &Config) -> PathBuf {
    cfg.storage_path
        .clone()
        .or_else(AppDirs::storage_path)
        .unwrap_or_else(|| PathBuf::from("reflex_storage.json"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()
            .map(|file| (path, file))
    });

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %log_path.display(), "logging initialized");
        return;
    }

    // no log file: stay silent rather than write over the tui
    tracing_subscriber::registry().with(env_filter).init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }
    let delay_range = config.delay_range()?;

    if cli.save_config {
        config_store.save(&config)?;
        tracing::info!(path = %config_store.path().display(), "saved config");
    }

    let path = storage_path(&config);
    let mut scores = ScoreStore::open(Box::new(FileKeyValueStore::with_path(&path)));

    if cli.is_one_shot() {
        if cli.reset_scores {
            scores.clear()?;
            println!("cleared score history in {}", path.display());
        }
        if let Some(out) = &cli.export {
            export_csv(out, scores.scores())?;
            println!("exported {} rounds to {}", scores.len(), out.display());
        }
        if cli.print_stats {
            print_stats(&scores, config.history_len);
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let game = Game::new(SystemClock::new(), RandomDelay::new(delay_range), scores)
        .with_history_len(config.history_len);
    let mut app = App::new(game, config.click_region);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn print_stats(scores: &ScoreStore, history_len: usize) {
    let stats = Stats::from_scores(scores.scores());
    let or_dash = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |ms| format!("{ms} ms"));

    println!("rounds:  {}", stats.rounds);
    println!("best:    {}", or_dash(stats.best.map(|rt| rt.as_millis())));
    println!("average: {}", or_dash(stats.average));
    println!(
        "recent:  {}",
        recent_history(scores.scores(), history_len)
    );
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let mut area = terminal.draw(|f| ui(app, f))?.area;

    loop {
        match app.handle(runner.step(), area) {
            Control::Quit => break,
            Control::Redraw => {
                area = terminal.draw(|f| ui(app, f))?.area;
            }
            Control::Continue => {}
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(&app.screen, f.area());
}
