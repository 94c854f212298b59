use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::estimator::RateEstimator;
use crate::queue::SampleQueue;

const CHUNK_SIZE: usize = 16 * 1024;

/// Producer-thread body: stream the response, feed every chunk through the
/// estimator, push finalized samples onto the shared queue and the raw bytes
/// into the optional sink.
///
/// Runs to completion (or failure) regardless of the UI: closing the window
/// does not cancel the transfer.
pub fn run_download(
    client: &Client,
    url: &str,
    mut sink: Option<BufWriter<File>>,
    queue: Arc<SampleQueue>,
) -> Result<()> {
    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Requesting {url}"))?;

    info!(%url, "Transfer started");

    let start = Instant::now();
    let mut estimator = RateEstimator::new();
    let mut total_bytes: u64 = 0;
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = response.read(&mut buf).context("Reading response body")?;
        if n == 0 {
            break;
        }
        if let Some(file) = sink.as_mut() {
            file.write_all(&buf[..n]).context("Writing output file")?;
        }
        total_bytes += n as u64;

        let elapsed = start.elapsed().as_secs_f64();
        let avg_bps = if elapsed > 0.0 {
            total_bytes as f64 / elapsed
        } else {
            0.0
        };
        if let Some(sample) = estimator.observe(elapsed, total_bytes as f64, avg_bps) {
            queue.push(sample);
        }
    }

    if let Some(file) = sink.as_mut() {
        file.flush().context("Flushing output file")?;
    }
    debug!(total_bytes, "Transfer finished");
    Ok(())
}
