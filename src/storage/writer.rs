use std::time::Duration;

use anyhow::{Context as _, Result};
use sqlx::PgPool;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::{StreamExt as _, wrappers::UnboundedReceiverStream};
use tracing::{error, info};

use crate::db::{bulk_insert_samples, register_node};
use crate::storage::{ChannelRegistry, NodeChannels, Sample, StampedReading};

/// Persists stamped readings in batches, registering each node's channels
/// the first time the node shows up.
#[derive(Debug)]
pub struct SampleWriter {
    pool: PgPool,
    registry: ChannelRegistry,
    batch_size: usize,
    flush_interval: Duration,
}

impl SampleWriter {
    pub fn new(
        pool: PgPool,
        registry: ChannelRegistry,
        batch_size: usize,
        flush_interval: Duration,
    ) -> Self {
        Self {
            pool,
            registry,
            batch_size: batch_size.max(1),
            flush_interval,
        }
    }

    /// Runs until every [`crate::storage::ChannelSink`] feeding `rx` is dropped.
    pub async fn run(mut self, rx: UnboundedReceiver<StampedReading>) {
        let batches = UnboundedReceiverStream::new(rx)
            .chunks_timeout(self.batch_size, self.flush_interval);
        tokio::pin!(batches);

        while let Some(batch) = batches.next().await {
            if let Err(err) = self.write_batch(&batch).await {
                error!("failed to write {} readings: {err:#}", batch.len());
            }
        }

        info!("sample writer stopped");
    }

    async fn write_batch(&mut self, batch: &[StampedReading]) -> Result<()> {
        let (unregistered, samples) = plan_batch(&self.registry, batch);

        for node in unregistered {
            register_node(&self.pool, &node)
                .await
                .with_context(|| format!("failed to register node {}", node.node_id))?;
            info!(
                node_id = node.node_id,
                serial_number = %node.serial_number(),
                "registered mote channels"
            );
            self.registry.mark_registered(node);
        }

        bulk_insert_samples(&self.pool, &samples)
            .await
            .context("failed to insert samples")?;

        Ok(())
    }
}

/// Nodes that still need registering, and the samples of the whole batch.
pub fn plan_batch(
    registry: &ChannelRegistry,
    batch: &[StampedReading],
) -> (Vec<NodeChannels>, Vec<Sample>) {
    let mut unregistered: Vec<NodeChannels> = Vec::new();
    let mut samples = Vec::new();

    for stamped in batch {
        let (node, registered) = registry.resolve(&stamped.reading);
        samples.extend(stamped.samples(&node));

        if !registered && !unregistered.contains(&node) {
            unregistered.push(node);
        }
    }

    (unregistered, samples)
}
