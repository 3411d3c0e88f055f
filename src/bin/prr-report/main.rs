mod args;

use std::{io, process::ExitCode};

use anyhow::{Context as _, Result};
use args::Args;
use chrono::{TimeDelta, Utc};
use clap::Parser as _;
use keti_motes::{
    db::{count_samples_by_unit, new_pool},
    logging,
    prr::{Histogram, reception_rate},
};
use tracing::{error, info};

#[derive(Debug)]
struct ChannelRate {
    node_id: i32,
    channel: String,
    unit: String,
    samples: i64,
    prr: f64,
}

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

    let since = Utc::now() - TimeDelta::hours(args.hours.into());

    let mut rates = Vec::new();
    for unit in &args.units {
        let counts = count_samples_by_unit(&pool, &unit.unit, since)
            .await
            .with_context(|| format!("failed to query sample counts for {}", unit.unit))?;
        info!(unit = %unit.unit, channels = counts.len(), "counted samples");

        rates.extend(counts.into_iter().map(|c| ChannelRate {
            node_id: c.node_id,
            channel: c.name,
            unit: unit.unit.clone(),
            samples: c.samples,
            prr: reception_rate(c.samples.max(0) as u64, args.hours, unit.period_secs),
        }));
    }

    if args.csv {
        return write_csv(&rates);
    }

    let prrs: Vec<f64> = rates.iter().map(|r| r.prr).collect();
    let histogram = Histogram::new(&prrs, args.bins);
    if histogram.is_empty() {
        println!("no samples in the last {} hours", args.hours);
        return Ok(());
    }

    println!(
        "packet reception rate over {} hours, {} channels",
        args.hours,
        histogram.total()
    );
    print!("{}", histogram.render(args.width));

    Ok(())
}

fn write_csv(rates: &[ChannelRate]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());

    writer
        .write_record(["node_id", "channel", "unit", "samples", "prr"])
        .context("failed to write CSV header")?;
    for r in rates {
        writer
            .write_record([
                r.node_id.to_string(),
                r.channel.clone(),
                r.unit.clone(),
                r.samples.to_string(),
                format!("{:.4}", r.prr),
            ])
            .context("failed to write CSV record")?;
    }

    writer.flush().context("failed to flush CSV output")?;

    Ok(())
}
