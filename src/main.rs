//! Mdwatch - a live markdown preview server.
//!
//! Watches one directory for markdown files, renders each to a styled HTML
//! document under an `html/` subdirectory, and serves that subdirectory over
//! HTTP until interrupted.

mod cli;
mod config;
mod logger;
mod render;
mod serve;
mod state;
mod utils;
mod watch;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::Config;
use crossbeam::channel;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    state::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(Config::load(&cli)?);

    let output_dir = config.output_dir();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    // Subscribing to the watch directory and binding the port are the two
    // startup-fatal operations; both happen before any thread is spawned.
    let watch_loop = watch::WatchLoop::new(&config)?;
    let server = serve::bind(&config)?;

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    state::register_for_shutdown(server.handle(), shutdown_tx);

    // Backfill + watch loop get their own thread; the HTTP server keeps the
    // main thread until the accept loop is unblocked by shutdown.
    let watch_config = Arc::clone(&config);
    let watcher = thread::spawn(move || watch_loop.run(&watch_config, &shutdown_rx));

    server.run(&config);
    join_watcher(watcher);
    Ok(())
}

/// Wait for the watcher thread to finish (max 2 seconds).
fn join_watcher(handle: thread::JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}
