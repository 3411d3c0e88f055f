use chrono::DateTime;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::keti::Reading;
use crate::storage::NodeChannels;

#[derive(Debug, Clone, PartialEq)]
pub struct StampedReading {
    pub received_at: DateTime<Tz>,

    pub reading: Reading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub channel_uuid: Uuid,

    pub measured_at: DateTime<Tz>,

    pub value: f64,
}

impl StampedReading {
    /// One sample per channel present in the reading.
    pub fn samples(&self, node: &NodeChannels) -> Vec<Sample> {
        self.reading
            .channel_values()
            .into_iter()
            .filter_map(|(channel, value)| {
                Some(Sample {
                    channel_uuid: node.uuid(channel)?,
                    measured_at: self.received_at,
                    value: value.as_f64(),
                })
            })
            .collect()
    }
}
