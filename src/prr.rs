//! Packet reception rate statistics.
//!
//! A mote reporting every `period` seconds should deliver `3600 * hours /
//! period` samples per channel over a window of `hours`. The PRR of a channel
//! is the share of those that reached the archive.

use std::fmt::Write as _;

/// Received samples over expected samples. Values above 1.0 are possible
/// when a mote reports faster than its nominal period.
pub fn reception_rate(samples: u64, hours: u32, report_period_secs: u32) -> f64 {
    let expected = 3600.0 * hours as f64 / report_period_secs as f64;
    samples as f64 / expected
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,

    pub counts: Vec<usize>,
}

impl Histogram {
    /// Equal-width bins spanning the data. Every bin is half-open except the
    /// last, which also holds the maximum.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() || bins == 0 {
            return Self {
                edges: Vec::new(),
                counts: Vec::new(),
            };
        }

        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0; bins];
        for v in values {
            let i = (((v - lo) / width) as usize).min(bins - 1);
            counts[i] += 1;
        }

        Self { edges, counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Horizontal bar chart, the longest bar `width` characters wide.
    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        let max = self.counts.iter().copied().max().unwrap_or(0);

        for (i, &count) in self.counts.iter().enumerate() {
            let bar = if max == 0 { 0 } else { count * width / max };
            let _ = writeln!(
                out,
                "{:>7.3} - {:<7.3} | {:<width$} {count}",
                self.edges[i],
                self.edges[i + 1],
                "#".repeat(bar),
            );
        }

        out
    }
}
