use std::error::Error;
use std::io::{stdout, Write};
use std::time::Duration;

use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use folio_interact::logging::{default_log_level, init_logging, logging_status};
use folio_interact::observer::GeometryObserverHost;
use folio_interact::preview::{
    apply_command, poll_command, render_lines, sample_portfolio_page, terminal_viewport,
};
use folio_interact::{ControllerConfig, HeadlessPage, HttpRelay, PageController};
use log::info;
use spark_signals::derived;

/// Preview the portfolio page controller in the terminal.
#[derive(Parser, Debug)]
#[command(name = "folio-preview", version, about)]
struct Args {
    /// JSON controller configuration
    #[arg(long)]
    config: Option<String>,

    /// Page URL the headless page pretends to be served from
    #[arg(long, default_value = "http://localhost:5500/")]
    location: String,

    /// Relay endpoint for the contact form (defaults to FormSubmit for the owner email)
    #[arg(long)]
    relay_url: Option<String>,

    /// Sender address prefilled in the contact form
    #[arg(long, default_value = "visitor@example.com")]
    email: String,

    /// Write logs to this directory
    #[arg(long)]
    log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, dir)?;
        if let Some((level, dir)) = logging_status() {
            info!("event=logging_ready level={} dir={}", level, dir.display());
        }
    }

    let config = match &args.config {
        Some(path) => ControllerConfig::from_path(path)?,
        None => ControllerConfig::default(),
    };
    let relay_url = args.relay_url.clone().unwrap_or_else(|| {
        format!("https://formsubmit.co/ajax/{}", config.contact.owner_email)
    });

    let (cols, rows) = size()?;
    let (width, height) = terminal_viewport(cols, rows);
    let mut page = sample_portfolio_page(&args.location, &relay_url, &args.email)?;
    page.resize(width, height);

    let mut controller = PageController::builder(page, GeometryObserverHost::new())
        .config(config)
        .transport(HttpRelay::new())
        .mount();
    info!("event=preview_started location={}", args.location);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;
    let result = run(&mut controller);
    execute!(stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;

    result
}

fn run(
    controller: &mut PageController<HeadlessPage, GeometryObserverHost>,
) -> Result<(), Box<dyn Error>> {
    let progress = controller.state().progress.clone();
    let title = derived(move || format!("folio-preview  {:.0}%", progress.get()));

    loop {
        draw(controller, &title.get())?;
        let Some(command) = poll_command(Duration::from_millis(250))? else {
            continue;
        };
        if !apply_command(controller, command) {
            return Ok(());
        }
    }
}

fn draw(
    controller: &PageController<HeadlessPage, GeometryObserverHost>,
    title: &str,
) -> Result<(), Box<dyn Error>> {
    let (cols, _) = size()?;
    let mut out = stdout();

    queue!(out, Clear(ClearType::All), MoveTo(0, 0), Print(title))?;
    let status_color = controller
        .state()
        .status
        .get()
        .map(|status| status.tone.color());

    for (row, line) in render_lines(controller, usize::from(cols)).iter().enumerate() {
        let row = u16::try_from(row + 2).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row))?;
        match status_color.filter(|_| line.starts_with("form [")) {
            Some(c) => queue!(
                out,
                SetForegroundColor(Color::Rgb { r: c.r, g: c.g, b: c.b }),
                Print(line),
                ResetColor
            )?,
            None => queue!(out, Print(line))?,
        }
    }

    queue!(
        out,
        MoveTo(0, 10),
        Print("j/k scroll  m menu  1-4 links  s send  q quit")
    )?;
    out.flush()?;
    Ok(())
}
