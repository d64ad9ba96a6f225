mod app;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use app::{App, View};
use routetui::cases::{CaseSource, FileSource, QueueDirectory, WimsClient, scan_task};
use routetui::config::Config;
use routetui::logging;
use ui::{render_help, render_panel, render_warning};

/// Transfer route panel for case tool tasks
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Task page URL to open on startup
    #[arg(long)]
    url: Option<String>,

    /// Read a saved messages payload instead of the case tool
    #[arg(long, conflicts_with = "url")]
    file: Option<String>,

    /// Config file (default: ~/.config/routetui/config.toml)
    #[arg(long)]
    config: Option<String>,
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = logging::init_file_logging();
    if let Err(e) = &log_path {
        eprintln!("Logging disabled: {:#}", e);
    }

    // Load config
    let config = match &args.config {
        Some(path) => Config::load_from(&expand(path))?,
        None => Config::load(),
    };
    let directory = Arc::new(QueueDirectory::from_config(&config.directory));
    tracing::info!(
        queues = directory.target_count(),
        base_url = %config.service.base_url,
        "Starting"
    );

    let source: Box<dyn CaseSource> = match &args.file {
        Some(path) => Box::new(FileSource::new(expand(path))),
        None => Box::new(WimsClient::new(&config.service).context("building HTTP client")?),
    };

    let mut app = App::new(Arc::new(config), directory);
    match (&args.file, &args.url) {
        (Some(path), _) => app.open_task(FileSource::new(expand(path)).case_id()),
        (None, Some(url)) => app.navigate(url),
        (None, None) => app.set_status("Press g to open a task URL"),
    }
    if let Ok(path) = &log_path {
        tracing::debug!(path = %path.display(), "Logging to file");
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, source.as_ref());

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

fn run(terminal: &mut Term, app: &mut App, source: &dyn CaseSource) -> Result<()> {
    loop {
        terminal.draw(|f| render(app, f))?;

        // Debounced scan and warning
        if app.check_pending_scan() {
            scan_current(terminal, app, source)?;
        }
        app.check_pending_warning();

        // Poll with timeout so the timers fire without input
        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                app.clear_status();
                match app.view {
                    View::Panel => match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('g') => app.start_navigate(),
                        KeyCode::Char('r') => {
                            if app.visible {
                                app.request_rescan();
                                scan_current(terminal, app, source)?;
                            }
                        }
                        KeyCode::Char('m') => app.toggle_minimized(),
                        KeyCode::Char('w') => {
                            if !app.show_warning() {
                                app.set_status("No warning for this case");
                            }
                        }
                        KeyCode::Char('x') => app.leave_case(),
                        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
                        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
                        _ => {}
                    },
                    View::Navigate => match key.code {
                        KeyCode::Esc => app.cancel_navigate(),
                        KeyCode::Enter => app.submit_navigate(),
                        KeyCode::Backspace => {
                            app.url_input.pop();
                        }
                        KeyCode::Char(c) => app.url_input.push(c),
                        _ => {}
                    },
                    View::Warning => match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                            app.dismiss_warning()
                        }
                        _ => {}
                    },
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    if app.view == View::Warning {
                        app.dismiss_warning();
                    } else {
                        app.mouse_down(mouse.column, mouse.row);
                    }
                }
                MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
                MouseEventKind::Up(MouseButton::Left) => {
                    if !app.mouse_up() && app.on_minimize_button(mouse.column, mouse.row) {
                        app.toggle_minimized();
                    }
                }
                MouseEventKind::ScrollDown => app.scroll_down(),
                MouseEventKind::ScrollUp => app.scroll_up(),
                _ => {}
            },
            Event::Resize(_, _) => {
                // Panel is re-clamped on the next draw
            }
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Scan the open task, showing the scanning state while the fetch blocks
fn scan_current(terminal: &mut Term, app: &mut App, source: &dyn CaseSource) -> Result<()> {
    let Some(task_id) = app.begin_scan() else {
        return Ok(());
    };
    terminal.draw(|f| render(app, f))?;

    let directory = app.directory.clone();
    let report = scan_task(source, &task_id, &directory);
    app.finish_scan(report);
    Ok(())
}

fn render(app: &mut App, f: &mut Frame) {
    let area = f.area();
    let config = app.config.clone();
    let theme = &config.theme;

    // Split into main area and help bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let hint = match &app.task_id {
        Some(task_id) => format!("Task {}", task_id),
        None => "No case open".to_string(),
    };
    let background = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.fg_muted()).bg(theme.bg()));
    f.render_widget(background, chunks[0]);

    if app.visible {
        let panel = render_panel(f, chunks[0], app);
        app.set_areas(chunks[0], panel);
    } else {
        app.set_areas(chunks[0], Rect::default());
    }

    if app.view == View::Warning {
        let analysis = app
            .panel
            .last_report
            .as_ref()
            .and_then(|report| report.analysis());
        if let Some(analysis) = analysis {
            render_warning(f, chunks[0], analysis, config.layout.modal_width, theme);
        }
    }

    let url_input = (app.view == View::Navigate).then_some(app.url_input.as_str());
    render_help(
        f,
        chunks[1],
        app.view,
        app.status_message.as_deref(),
        url_input,
        theme,
    );
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
