use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::queue::SampleQueue;
use crate::transport::run_download;
use crate::tui;

/// Fatal initialization failures: anything that prevents entering the run
/// loop. Mapped to stable negative exit codes in `main`.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("cannot initialize terminal: {0}")]
    Terminal(#[source] std::io::Error),
    #[error("cannot initialize HTTP client: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("cannot open '{path}': {source}")]
    Output {
        path: String,
        source: std::io::Error,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    // Everything that can fail fatally happens before the run loop starts.
    let sink = match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| InitError::Output {
                path: path.display().to_string(),
                source,
            })?;
            Some(BufWriter::new(file))
        }
        None => None,
    };
    let client = Client::builder().build().map_err(InitError::Transport)?;

    let queue = Arc::new(SampleQueue::new());
    let stop = Arc::new(AtomicBool::new(false));
    let done = Arc::new(AtomicBool::new(false));

    {
        let stop = stop.clone();
        let _ = ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        });
    }

    // Producer thread: transport -> estimator -> queue. The UI never cancels
    // it; a failed transfer just ends the thread and the chart keeps its last
    // state.
    let url = cli.url.clone();
    let producer_queue = Arc::clone(&queue);
    let producer_done = done.clone();
    let producer = thread::spawn(move || -> Result<()> {
        let result = run_download(&client, &url, sink, producer_queue);
        producer_done.store(true, Ordering::Relaxed);
        result
    });

    let ui_result = tui::run(queue, &cli.url, stop, done);

    // Wait for the transfer so the output sink is complete before exiting.
    info!("Waiting for the transfer to finish");
    match producer.join() {
        Ok(Ok(())) => info!("Transfer thread finished"),
        Ok(Err(e)) => warn!(?e, "Transfer ended with an error"),
        Err(_) => error!("Transfer thread panicked"),
    }

    ui_result
}
