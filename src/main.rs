mod app;
mod cli;
mod config;
mod constants;
mod domain;
mod error;
mod storage;
mod time_format;

use std::sync::Mutex;

/// Sends traces to a file in the state directory; the terminal belongs to
/// the readout. Tracing stays off if the file cannot be created.
fn init_tracing() {
    let Ok(log_file) = storage::open_trace_file(&storage::get_trace_path()) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
}

fn main() {
    init_tracing();
    cli::run_cli();
}
