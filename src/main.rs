use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use riskwatch::logging::{self, LogTarget};
use riskwatch::{
    events, export, ui, App, CsvProvider, DashboardData, DashboardQuery, DataProvider, Dataset,
    MockProvider, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "riskwatch")]
#[command(about = "KPI and alert dashboard for cross-border e-commerce operations")]
struct Args {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read records from a CSV file instead of generating them
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Seed for generated records
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generated records per fetch
    #[arg(long)]
    records: Option<usize>,

    /// Department name, or ALL
    #[arg(short, long)]
    department: Option<String>,

    /// First day of the date range (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Average delay in days above which an alert fires (7-30)
    #[arg(long)]
    delay_threshold: Option<u32>,

    /// Pass/success rate percentage below which an alert fires (70-95)
    #[arg(long)]
    quality_threshold: Option<u32>,

    /// Dead-stock rate percentage above which an alert fires (5-30)
    #[arg(long)]
    inventory_threshold: Option<u32>,

    /// Re-fetch interval in seconds, 0 to disable
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Export the filtered records as CSV and exit. A directory gets a
    /// generated filename.
    #[arg(short, long, conflicts_with = "report")]
    export: Option<PathBuf>,

    /// Print the KPI/alert report as JSON and exit
    #[arg(long)]
    report: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Override loaded settings with any flags given on the command line.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref path) = self.csv {
            settings.csv_path = Some(path.clone());
        }
        if let Some(seed) = self.seed {
            settings.mock.seed = seed;
        }
        if let Some(records) = self.records {
            settings.mock.records = records;
        }
        if let Some(ref department) = self.department {
            settings.department = department.clone();
        }
        if self.start.is_some() {
            settings.start = self.start;
        }
        if self.end.is_some() {
            settings.end = self.end;
        }
        if let Some(days) = self.delay_threshold {
            settings.thresholds.delay_days = days;
        }
        if let Some(pct) = self.quality_threshold {
            settings.thresholds.quality_pct = pct;
        }
        if let Some(pct) = self.inventory_threshold {
            settings.thresholds.inventory_pct = pct;
        }
        if let Some(secs) = self.refresh {
            settings.refresh_secs = secs;
        }
    }

    fn is_batch(&self) -> bool {
        self.export.is_some() || self.report
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.thresholds.validate()?;

    let target = if args.is_batch() {
        LogTarget::for_batch(args.log_file.clone())
    } else {
        LogTarget::for_tui(args.log_file.clone())
    };
    logging::init(&target)?;

    let query = settings.query(Local::now().date_naive())?;
    let provider = build_provider(&settings);
    info!(
        source = provider.description(),
        department = %query.department,
        range = %query.range,
        "starting"
    );

    // Non-interactive modes
    if let Some(ref path) = args.export {
        return export_to_file(provider, &query, path);
    }
    if args.report {
        return print_report(provider, &query);
    }

    run_tui(provider, query, Duration::from_secs(settings.refresh_secs))
}

fn build_provider(settings: &Settings) -> Box<dyn DataProvider> {
    match settings.csv_path {
        Some(ref path) => Box::new(CsvProvider::new(path)),
        None => Box::new(MockProvider::with_count(settings.mock.seed, settings.mock.records)),
    }
}

/// Fetch and compute once, for the non-interactive modes.
fn compute_once(mut provider: Box<dyn DataProvider>, query: &DashboardQuery) -> Result<DashboardData> {
    let records = provider.fetch(&query.range)?;
    Ok(DashboardData::compute(&Dataset::new(records), query))
}

/// Export the filtered records to CSV
fn export_to_file(provider: Box<dyn DataProvider>, query: &DashboardQuery, target: &Path) -> Result<()> {
    let data = compute_once(provider, query)?;
    let path = export::resolve_csv_path(target, query);
    export::export_csv(&data, &path)?;
    println!("Exported {} records to: {}", data.dataset.len(), path.display());
    Ok(())
}

/// Print the KPI/alert report to stdout
fn print_report(provider: Box<dyn DataProvider>, query: &DashboardQuery) -> Result<()> {
    let data = compute_once(provider, query)?;
    export::write_report(&data, query, io::stdout().lock())
}

/// Run the TUI with the given provider
fn run_tui(provider: Box<dyn DataProvider>, query: DashboardQuery, refresh_interval: Duration) -> Result<()> {
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
    let mut app = App::new(provider, query);
    if let Err(e) = app.reload_data() {
        app.set_status_message(format!("加载失败: {:#}", e));
    }

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

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 80;
    const MIN_HEIGHT: u16 = 20;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, ui::centered(area, area.width, 5));
                return;
            }

            ui::render(frame, app);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, ui::CONTENT_TOP),
                _ => {}
            }
        }

        // Periodic re-fetch; failures are shown in the status bar
        if !refresh_interval.is_zero() && last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
