mod args;
mod serial;

use std::{num::NonZeroUsize, process::ExitCode};

use anyhow::{Context as _, Result, anyhow};
use args::Args;
use clap::Parser as _;
use keti_motes::{
    db::new_pool,
    keti::{IngestionSession, SequenceCache, Sht11Calibration},
    logging,
    storage::{ChannelRegistry, ChannelSink, DEFAULT_NAMESPACE, SampleWriter},
    tinyos::HdlcDecoder,
};
use tokio::{
    io::AsyncReadExt as _,
    signal,
    sync::mpsc,
    time::{Duration, interval},
};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let pool = new_pool(&args.database_url)
        .await
        .context("failed to connect to database")?;

    let mut port = serial::open(&args.serial_port, args.baud_rate)?;
    info!(
        port = %args.serial_port,
        baud_rate = args.baud_rate,
        "listening for KETI motes"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let registry = ChannelRegistry::new(args.namespace.unwrap_or(DEFAULT_NAMESPACE));
    let writer = SampleWriter::new(
        pool,
        registry,
        args.batch_size,
        Duration::from_millis(args.flush_interval_ms),
    );
    let writer_handle = tokio::spawn(writer.run(rx));

    let mut session = IngestionSession::with_parts(
        ChannelSink::new(tx, args.timezone),
        SequenceCache::new(NonZeroUsize::new(args.sequence_cache_capacity)),
        Sht11Calibration::default(),
    );
    let mut decoder = HdlcDecoder::new();

    let mut stats_timer = interval(Duration::from_secs(args.stats_interval_secs.max(1)));
    stats_timer.tick().await;

    let mut buf = [0u8; 512];
    let result = loop {
        tokio::select! {
            read = port.read(&mut buf) => {
                let n = match read.context("failed to read from serial port") {
                    Ok(0) => break Err(anyhow!("serial port closed")),
                    Ok(n) => n,
                    Err(e) => break Err(e),
                };

                for frame in decoder.push(&buf[..n]) {
                    let submission = session.submit(&frame);
                    debug!(len = frame.len(), ?submission, "frame");
                }
            }
            _ = stats_timer.tick() => {
                let framing = decoder.stats();
                let ingest = session.stats();
                info!(
                    frames = framing.frames,
                    crc_errors = framing.crc_errors,
                    forwarded = ingest.forwarded,
                    duplicates = ingest.duplicates,
                    rejected = ingest.rejected,
                    sink_failures = ingest.sink_failures,
                    cached_keys = session.cache().len(),
                    "ingestion stats"
                );
            }
            _ = signal::ctrl_c() => {
                info!("shutting down");
                break Ok(());
            }
        }
    };

    // closes the channel so the writer drains and stops
    drop(session);
    writer_handle.await.context("sample writer task failed")?;

    result
}
