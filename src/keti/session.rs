use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;

use tracing::{debug, trace, warn};

use crate::keti::{
    DecodeError, FrameHeader, ReadingSink, Reading, Sht11Calibration, decode_header,
    decode_payload,
};

pub const DEFAULT_SEQUENCE_CACHE_CAPACITY: usize = 4096;

/// Deduplication unit. Motes retransmit with the same sequence number, so a
/// repeated key is a retransmission regardless of payload.
///
/// Two motes configured with the same node id collide here; the serial id is
/// not part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub node_id: u16,
    pub sequence: u16,
}

impl From<&FrameHeader> for SequenceKey {
    fn from(header: &FrameHeader) -> Self {
        Self {
            node_id: header.node_id,
            sequence: header.sequence,
        }
    }
}

/// Set of recently seen sequence keys.
///
/// When bounded, the oldest inserted key is forgotten once `capacity` keys
/// are held. Sequence numbers wrap at 65536 per node, so a forgotten key can
/// legitimately come back.
#[derive(Debug, Clone)]
pub struct SequenceCache {
    seen: HashSet<SequenceKey>,
    order: VecDeque<SequenceKey>,
    capacity: Option<NonZeroUsize>,
}

impl SequenceCache {
    /// `None` never forgets a key.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, key: &SequenceKey) -> bool {
        self.seen.contains(key)
    }

    /// Records `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: SequenceKey) -> bool {
        if !self.seen.insert(key) {
            return false;
        }

        if let Some(capacity) = self.capacity {
            self.order.push_back(key);
            while self.order.len() > capacity.get() {
                if let Some(oldest) = self.order.pop_front() {
                    self.seen.remove(&oldest);
                }
            }
        }

        true
    }
}

impl Default for SequenceCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_SEQUENCE_CACHE_CAPACITY))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Forwarded(SequenceKey),
    /// The reading was decoded but the sink refused it. The key stays recorded.
    SinkFailed(SequenceKey),
    Duplicate(SequenceKey),
    Rejected(DecodeError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub forwarded: u64,
    pub sink_failures: u64,
    pub duplicates: u64,
    pub rejected: u64,
}

/// One deduplicating receiver per connection to a mote network.
#[derive(Debug)]
pub struct IngestionSession<S> {
    cache: SequenceCache,
    calibration: Sht11Calibration,
    sink: S,
    stats: SessionStats,
}

impl<S: ReadingSink> IngestionSession<S> {
    pub fn new(sink: S) -> Self {
        Self::with_parts(sink, SequenceCache::default(), Sht11Calibration::default())
    }

    pub fn with_parts(sink: S, cache: SequenceCache, calibration: Sht11Calibration) -> Self {
        Self {
            cache,
            calibration,
            sink,
            stats: SessionStats::default(),
        }
    }

    pub fn submit(&mut self, frame: &[u8]) -> Submission {
        let header = match decode_header(frame) {
            Ok(h) => h,
            Err(err) => {
                trace!(error = %err, "dropping frame");
                self.stats.rejected += 1;
                return Submission::Rejected(err);
            }
        };

        let key = SequenceKey::from(&header);
        if !self.cache.insert(key) {
            trace!(node_id = key.node_id, sequence = key.sequence, "duplicate sequence");
            self.stats.duplicates += 1;
            return Submission::Duplicate(key);
        }

        let reading = Reading {
            serial_id: header.serial_id,
            node_id: header.node_id,
            sequence: header.sequence,
            battery: header.battery,
            payload: decode_payload(header.type_tag, &header.sensor_payload, &self.calibration),
        };
        debug!(
            node_id = reading.node_id,
            sequence = reading.sequence,
            battery = reading.battery,
            payload = ?reading.payload,
            "reading received"
        );

        match self.sink.reading_received(reading) {
            Ok(()) => {
                self.stats.forwarded += 1;
                Submission::Forwarded(key)
            }
            Err(err) => {
                warn!(
                    node_id = key.node_id,
                    sequence = key.sequence,
                    "sink rejected reading: {err:#}"
                );
                self.stats.sink_failures += 1;
                Submission::SinkFailed(key)
            }
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn cache(&self) -> &SequenceCache {
        &self.cache
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
