use anyhow::{Context as _, Result};
use chrono::Utc;
use chrono_tz::Tz;
use tokio::sync::mpsc::UnboundedSender;

use crate::keti::{Reading, ReadingSink};
use crate::storage::StampedReading;

/// Hands readings over to a [`crate::storage::SampleWriter`] task, stamped
/// with the time they were received.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<StampedReading>,
    timezone: Tz,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<StampedReading>, timezone: Tz) -> Self {
        Self { tx, timezone }
    }
}

impl ReadingSink for ChannelSink {
    fn reading_received(&mut self, reading: Reading) -> Result<()> {
        let received_at = Utc::now().with_timezone(&self.timezone);

        self.tx
            .send(StampedReading {
                received_at,
                reading,
            })
            .context("sample writer is gone")
    }
}
