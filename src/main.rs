//! Slidedown - a single-document presentation builder with live reload.

mod cli;
mod compiler;
mod config;
mod logger;
mod serve;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use compiler::Compiler;
use config::ProjectConfig;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    thread,
};
use tiny_http::Server;
use watch::Mode;

/// Outcome reported by a worker to the parent.
///
/// The parent blocks on the channel; the first event wins and the process
/// exit tears down the remaining worker.
enum WorkerEvent {
    /// Ctrl+C.
    Interrupted,
    /// A worker died with a fatal error.
    Failed(anyhow::Error),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::set_verbose(cli.debug);

    // Config failures abort before any build
    let config = match &cli.config {
        Some(path) => ProjectConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ProjectConfig::default(),
    };

    let templates = cli
        .templates
        .clone()
        .unwrap_or_else(compiler::default_templates_dir);
    let input_dir = cli.input.parent().unwrap_or(Path::new(".")).to_path_buf();
    let output = input_dir.join(&cli.output);
    let presenter = cli.presenter.clone();

    let pipeline = Compiler::new(&templates, &config)?;
    let watch_set = pipeline.build(&cli.input, &output, &config, presenter.as_deref())?;
    log!("build"; "wrote {}", output.join("index.html").display());

    match (cli.autoreload, cli.serve) {
        (true, true) => run_workers(pipeline, watch_set, output, config, presenter, cli.port),
        (true, false) => {
            log!("watch"; "started autoreload...");
            watch::autoreload(
                &pipeline,
                watch_set,
                &output,
                &config,
                presenter.as_deref(),
                Mode::TrackAssets,
            )
        }
        (false, true) => serve_blocking(&output, cli.port),
        (false, false) => Ok(()),
    }
}

/// Run the autoreload coordinator and the static server as independent
/// workers sharing nothing but the output directory on disk.
///
/// Each worker reports a fatal error on the event channel; Ctrl+C reports
/// an interrupt. The parent blocks until the first event, unblocks the
/// server and exits, which stops the other worker with the process.
fn run_workers(
    pipeline: Compiler,
    watch_set: Vec<PathBuf>,
    output: PathBuf,
    config: ProjectConfig,
    presenter: Option<String>,
    port: u16,
) -> Result<()> {
    let server = Arc::new(serve::bind(port)?);
    let (tx, rx) = mpsc::channel::<WorkerEvent>();

    let tx_signal = tx.clone();
    ctrlc::set_handler(move || {
        tx_signal.send(WorkerEvent::Interrupted).ok();
    })
    .context("Failed to set Ctrl+C handler")?;

    let tx_reload = tx.clone();
    let reload_output = output.clone();
    thread::spawn(move || {
        if let Err(err) = watch::autoreload(
            &pipeline,
            watch_set,
            &reload_output,
            &config,
            presenter.as_deref(),
            Mode::TrackAssets,
        ) {
            tx_reload.send(WorkerEvent::Failed(err)).ok();
        }
    });

    let server_worker = Arc::clone(&server);
    thread::spawn(move || {
        if let Err(err) = serve::serve(&server_worker, &output) {
            tx.send(WorkerEvent::Failed(err)).ok();
        }
    });

    log!("serve"; "http://localhost:{port} with autoreload ...");
    wait_for_workers(&rx, &server)
}

/// Block on the worker channel and translate the first event.
fn wait_for_workers(rx: &mpsc::Receiver<WorkerEvent>, server: &Server) -> Result<()> {
    let event = rx.recv().context("Worker channel closed unexpectedly")?;
    server.unblock();
    match event {
        WorkerEvent::Interrupted => {
            log!("serve"; "shutting down...");
            Ok(())
        }
        WorkerEvent::Failed(err) => Err(err),
    }
}

/// Serve the output directory until Ctrl+C.
fn serve_blocking(output: &Path, port: u16) -> Result<()> {
    let server = Arc::new(serve::bind(port)?);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://localhost:{port} ...");
    serve::serve(&server, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_worker_failure_reaches_parent() {
        let (tx, rx) = mpsc::channel::<WorkerEvent>();
        let server = serve::bind(0).unwrap();

        tx.send(WorkerEvent::Failed(anyhow!("watch worker died")))
            .unwrap();

        let result = wait_for_workers(&rx, &server);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("watch worker died"));
    }

    #[test]
    fn test_interrupt_unblocks_cleanly() {
        let (tx, rx) = mpsc::channel::<WorkerEvent>();
        let server = serve::bind(0).unwrap();

        tx.send(WorkerEvent::Interrupted).unwrap();
        assert!(wait_for_workers(&rx, &server).is_ok());
    }
}
