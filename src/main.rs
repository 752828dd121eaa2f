use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use turbidity_watch::config::Settings;
use turbidity_watch::data::duration::{format_duration, parse_duration};
use turbidity_watch::data::seed::default_fleet;
use turbidity_watch::data::SensorStore;
use turbidity_watch::export::{self, ExportFormat};
use turbidity_watch::feed::{self, MockFeed};
use turbidity_watch::logging::{self, LogTarget};
use turbidity_watch::uplink::{UplinkServer, UplinkSimulator};
use turbidity_watch::{events, ui, App, ChannelSource, DataSource, FileSource};

#[derive(Parser, Debug)]
#[command(name = "turbidity-watch")]
#[command(about = "Terminal dashboard for simulated water turbidity sensors")]
struct Args {
    /// Path to a TOML config file (default: turbidity-watch.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mock feed tick interval (e.g., "5s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Seed the mock feed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for exports made from the TUI
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Replay an exported JSON document instead of the live feed
    #[arg(long, conflicts_with_all = ["export", "webhook", "simulate"])]
    replay: Option<PathBuf>,

    /// Export the seeded fleet to a file and exit
    #[arg(short, long, conflicts_with_all = ["webhook", "simulate"])]
    export: Option<PathBuf>,

    /// Export format (default: from the file extension, else CSV)
    #[arg(long, value_enum, requires = "export")]
    format: Option<ExportFormat>,

    /// Run the uplink webhook receiver on this address (e.g., "0.0.0.0:3001")
    #[arg(long, num_args = 0..=1, default_missing_value = "", conflicts_with = "simulate")]
    webhook: Option<String>,

    /// Post mock uplinks for the fleet to this webhook URL
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    simulate: Option<String>,

    /// Keep posting uplinks on the configured interval
    #[arg(long, requires = "simulate")]
    repeat: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    apply_overrides(&mut settings, &args)?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        logging::init(&settings.logging, LogTarget::Stderr)?;
        return export_to_file(export_path, args.format);
    }

    if let Some(ref addr) = args.webhook {
        logging::init(&settings.logging, LogTarget::Stderr)?;
        let addr = if addr.is_empty() { &settings.uplink.listen_addr } else { addr };
        return run_webhook(addr);
    }

    if let Some(ref url) = args.simulate {
        logging::init(&settings.logging, LogTarget::Stderr)?;
        let url = if url.is_empty() { &settings.uplink.webhook_url } else { url };
        return run_simulator(url, &settings, args.repeat);
    }

    logging::init(&settings.logging, LogTarget::File)?;

    if let Some(ref path) = args.replay {
        return run_with_replay(path, &settings);
    }

    run_with_feed(&settings)
}

/// Fold command-line flags into the loaded settings.
fn apply_overrides(settings: &mut Settings, args: &Args) -> Result<()> {
    if let Some(ref interval) = args.interval {
        settings.feed.interval =
            parse_duration(interval).with_context(|| format!("Invalid --interval {}", interval))?;
    }
    if let Some(seed) = args.seed {
        settings.feed.seed = Some(seed);
    }
    if let Some(ref dir) = args.export_dir {
        settings.export.dir = dir.clone();
    }
    Ok(())
}

/// Run the TUI against the live mock feed.
fn run_with_feed(settings: &Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let store = SensorStore::seeded();
    let description = format!("mock feed, every {}", format_duration(settings.feed.interval));
    let source = ChannelSource::new(store.subscribe(), &description);

    let config = settings.feed.feed_config();
    let mock = match settings.feed.seed {
        Some(seed) => MockFeed::seeded(seed, config),
        None => MockFeed::from_entropy(config),
    };
    let handle = feed::spawn(store, mock);

    info!(
        interval = ?settings.feed.interval,
        seed = ?settings.feed.seed,
        "Starting dashboard with mock feed"
    );

    // Run the TUI in the main thread while the runtime drives the feed
    let result = run_tui(Box::new(source), &settings.export.dir, Duration::from_millis(250));

    handle.stop();
    info!("Dashboard closed");

    result
}

/// Run the TUI against a replayed export.
fn run_with_replay(path: &Path, settings: &Settings) -> Result<()> {
    info!(path = %path.display(), "Starting dashboard in replay mode");
    let source = Box::new(FileSource::new(path));
    run_tui(source, &settings.export.dir, Duration::from_secs(1))
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, export_dir: &Path, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(source, export_dir);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW);
                }
                _ => {}
            }
        }

        // Finish a manual refresh once its delay is up
        app.tick(Instant::now());

        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Export the seeded fleet to a file
fn export_to_file(path: &Path, format: Option<ExportFormat>) -> Result<()> {
    let format = format
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or(ExportFormat::Csv);

    let now = Utc::now();
    export::write_to(path, format, &default_fleet(now), now)?;

    info!(path = %path.display(), ?format, "Export written");
    println!("Exported sensor data to: {}", path.display());
    Ok(())
}

/// Run the uplink webhook receiver until interrupted.
fn run_webhook(addr: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let server = UplinkServer::bind(addr).await?;
        println!("Uplink webhook listening on http://{}", server.local_addr()?);

        tokio::select! {
            result = server.serve() => result?,
            _ = tokio::signal::ctrl_c() => info!("Shutting down webhook"),
        }
        Ok(())
    })
}

/// Post mock uplinks for the default fleet, once or repeatedly.
fn run_simulator(url: &str, settings: &Settings, repeat: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let simulator = UplinkSimulator::builder()
            .webhook_url(url)
            .application_id(settings.uplink.application_id.clone())
            .build()?;

        let fleet = default_fleet(Utc::now());

        if !repeat {
            let report = simulator.send_all(&fleet).await;
            println!(
                "Posted {} uplinks to {} ({} failed)",
                report.sent,
                url,
                report.failed.len()
            );
            if !report.is_success() {
                anyhow::bail!("{} uplink posts failed", report.failed.len());
            }
            return Ok(());
        }

        let config = settings.feed.feed_config();
        let mock = match settings.feed.seed {
            Some(seed) => MockFeed::seeded(seed, config),
            None => MockFeed::from_entropy(config),
        };

        println!(
            "Posting uplinks to {} every {} (Ctrl-C to stop)",
            url,
            format_duration(settings.uplink.interval)
        );
        tokio::select! {
            _ = simulator.run_repeating(fleet, mock, settings.uplink.interval) => {}
            _ = tokio::signal::ctrl_c() => info!("Stopping simulator"),
        }
        Ok(())
    })
}
