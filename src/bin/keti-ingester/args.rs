use chrono_tz::Tz;
use clap::Parser;
use keti_motes::keti::DEFAULT_SEQUENCE_CACHE_CAPACITY;
use uuid::Uuid;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "SERIAL_PORT", default_value = "/dev/ttyrd00")]
    pub serial_port: String,

    #[arg(long, env = "BAUD_RATE", default_value_t = 115200)]
    pub baud_rate: u32,

    /// Namespace for channel UUIDs
    #[arg(long, env = "KETI_NAMESPACE")]
    pub namespace: Option<Uuid>,

    #[arg(long, env = "TZ")]
    pub timezone: Tz,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Number of (node, sequence) pairs remembered for deduplication; 0 never forgets
    #[arg(long, default_value_t = DEFAULT_SEQUENCE_CACHE_CAPACITY)]
    pub sequence_cache_capacity: usize,

    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1000)]
    pub flush_interval_ms: u64,

    #[arg(long, default_value_t = 300)]
    pub stats_interval_secs: u64,
}
