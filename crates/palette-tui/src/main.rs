mod app;
mod board;
mod render;
mod settings;

use app::{App, Module};
use board::{BoardView, StatusHost};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use palette_core::palette::DEFAULT_MAX_ATTEMPTS;
use palette_core::{FailurePolicy, ModuleConfig, ModuleIdCounter, SynthesisConfig, GRID_SIZE};
use settings::Settings;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "palette-ident", version, about = "Palette Identification grid puzzle")]
struct Cli {
    /// Rule seed shared between players
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    seed: i32,
    /// Show colorblind labels from the start
    #[arg(long, conflicts_with = "no_colorblind")]
    colorblind: bool,
    /// Hide colorblind labels even if the saved settings enable them
    #[arg(long)]
    no_colorblind: bool,
    /// Exit with an error instead of passing when the seed has no palette
    #[arg(long)]
    propagate_failures: bool,
    /// Palette draws before giving up on a rule seed
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,
    /// Where to write the diagnostic log in interactive mode
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Print the generated puzzle and exit
    #[arg(long)]
    dump: bool,
    /// Print the dump as JSON
    #[arg(long, requires = "dump")]
    json: bool,
}

impl Cli {
    fn module_config(&self, settings: &Settings) -> ModuleConfig {
        let colorblind = if self.colorblind {
            true
        } else if self.no_colorblind {
            false
        } else {
            settings.colorblind
        };
        ModuleConfig {
            synthesis: SynthesisConfig {
                max_attempts: self.max_attempts,
                ..SynthesisConfig::default()
            },
            failure_policy: if self.propagate_failures {
                FailurePolicy::Propagate
            } else {
                FailurePolicy::ForcePass
            },
            colorblind,
            ..ModuleConfig::default()
        }
    }
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("palette-ident")
        .join("palette-ident.log")
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if cli.dump {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(env_filter)
            .init();
        return Ok(());
    }

    // Log lines would corrupt the alternate screen, so they go to a file
    let path = cli.log_file.clone().unwrap_or_else(default_log_path);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = File::options().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(env_filter)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let settings = Settings::load();
    let ids = ModuleIdCounter::new();
    let module = Module::new(
        ids.next_id(),
        cli.seed,
        cli.module_config(&settings),
        StatusHost::default(),
        BoardView::default(),
        &mut rand::thread_rng(),
    )
    .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

    if cli.dump {
        return dump(&module, cli.json);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Run the app
    let mut app = App::new(module, settings);
    let result = run_app(&mut stdout, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn dump(module: &Module, json: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let Some(summary) = module.summary() else {
        if let Some(err) = module.failure() {
            writeln!(stdout, "{}", err)?;
        }
        return Ok(());
    };

    if json {
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(stdout)?;
        return Ok(());
    }

    writeln!(stdout, "Rule seed:     {}", summary.rule_seed)?;
    writeln!(stdout, "Hidden bitmap: {}", summary.chosen_bitmap + 1)?;
    writeln!(stdout, "Palette:       {}", summary.palette.describe())?;
    writeln!(stdout, "Colors:        {}", summary.colors.describe())?;
    writeln!(stdout, "Displayed grid:")?;
    for row in summary.grid.chunks(GRID_SIZE) {
        let line: String = row.iter().map(|g| char::from(b'0' + g)).collect();
        writeln!(stdout, "  {}", line)?;
    }
    Ok(())
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        // Render
        render::render(stdout, app)?;
        stdout.flush()?;

        // Handle input with timeout for timers
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
