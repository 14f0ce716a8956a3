use std::{
    io,
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use crate::{
    config::Config,
    constants::{TIME_SETTINGS, WINDOW_TITLES},
    domain::{Records, TrackerState},
    error::TrackerError,
};

mod event_handlers;
mod history_view;
mod render_views;
mod view_style;

use view_style::Palette;

struct App {
    records: Records,
    palette: Palette,
    spans: [String; 3],
    show_history: bool,
    status_message: Option<String>,
    render_needed: bool,
}

impl App {
    fn new(records: Records, config: &Config) -> Self {
        let spans = records.formatted_spans();
        Self {
            records,
            palette: Palette::from_config(&config.colors),
            spans,
            show_history: false,
            status_message: None,
            render_needed: true,
        }
    }

    /// Refreshes the live session and marks a repaint only when one of the
    /// displayed spans changed.
    fn tick(&mut self) {
        self.records.update(Local::now().naive_local());
        let spans = self.records.formatted_spans();
        if spans != self.spans {
            self.spans = spans;
            self.render_needed = true;
        }
    }

    fn toggle(&mut self) {
        match self.records.toggle(Local::now().naive_local()) {
            Ok(TrackerState::Tracking) => {
                info!("tracking started");
                self.status_message = None;
            }
            Ok(TrackerState::Idle) => {
                info!(total = %self.records.last_record().today_total_span(), "tracking stopped");
            }
            Err(e) => {
                error!("could not save record: {}", e);
                self.status_message = Some(format!("save failed: {}", e));
            }
        }
        self.tick();
        self.render_needed = true;
    }

    fn show_daily_average(&mut self) {
        let message = match self.records.daily_average(Local::now().naive_local()) {
            Ok(average) => average.to_string(),
            Err(e) => e.to_string(),
        };
        info!("daily average: {}", message);
        self.status_message = Some(message);
        self.render_needed = true;
    }

    fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
        self.render_needed = true;
    }

    fn title(&self) -> &'static str {
        match self.records.state() {
            TrackerState::Tracking => WINDOW_TITLES.running,
            TrackerState::Idle => WINDOW_TITLES.stopped,
        }
    }

    /// Closes an open session, or flushes a new day's header, before exit.
    fn shutdown(&mut self) -> Result<(), TrackerError> {
        if self.records.is_tracking() {
            self.records.toggle(Local::now().naive_local())?;
        } else {
            self.records.save()?;
        }
        Ok(())
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

pub fn run_ui(records: Records, config: &Config) -> Result<(), TrackerError> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(records, config);
    let loop_result = run_loop(&mut terminal, &mut app, config);
    let shutdown_result = app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    loop_result?;
    shutdown_result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
) -> Result<(), TrackerError> {
    let tick_rate = Duration::from_millis(config.refresh_ms.max(TIME_SETTINGS.min_refresh_ms));
    let render_rate = Duration::from_millis(1000 / TIME_SETTINGS.max_render_fps);
    let mut last_tick = Instant::now();
    let mut last_render = Instant::now()
        .checked_sub(render_rate)
        .unwrap_or_else(Instant::now);

    loop {
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.render_needed && last_render.elapsed() >= render_rate {
            terminal.draw(|f| app.draw_frame(f))?;
            app.render_needed = false;
            last_render = Instant::now();
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if app.handle_key(key) => break,
                Event::Resize(_, _) => app.render_needed = true,
                _ => {}
            }
        }
    }

    Ok(())
}
