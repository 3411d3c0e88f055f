//! TinyOS serial framing.
//!
//! Packets travel as HDLC-like frames: `0x7E` delimits, `0x7D` escapes the
//! following byte which is XORed with `0x20`. The last two bytes of a frame
//! are a CRC-16 (polynomial 0x1021, initial value 0) in little-endian order,
//! computed over everything before them.
//!
//! Decoded frames keep the leading protocol byte, so a KETI report comes out
//! as the 29-byte packet expected by [`crate::keti::decode_frame`].

use crc::{CRC_16_XMODEM, Crc};
use tracing::warn;

pub const SYNC: u8 = 0x7e;
pub const ESCAPE: u8 = 0x7d;
pub const XOR: u8 = 0x20;

pub const PROTOCOL_PACKET_NO_ACK: u8 = 0x45;

pub const MAX_FRAME_LENGTH: usize = 256;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramingStats {
    pub frames: u64,
    pub crc_errors: u64,
    pub oversize: u64,
    pub runts: u64,
}

#[derive(Debug, Default)]
pub struct HdlcDecoder {
    buf: Vec<u8>,
    escaped: bool,
    overflowed: bool,
    stats: FramingStats,
}

impl HdlcDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push bytes, returning any completed frames with their CRC removed.
    pub fn push(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();

        for &b in data {
            match b {
                SYNC => {
                    if let Some(frame) = self.finish() {
                        frames.push(frame);
                    }
                }
                ESCAPE => self.escaped = true,
                b => {
                    let b = if self.escaped { b ^ XOR } else { b };
                    self.escaped = false;

                    if self.buf.len() >= MAX_FRAME_LENGTH {
                        self.overflowed = true;
                    } else {
                        self.buf.push(b);
                    }
                }
            }
        }

        frames
    }

    pub fn stats(&self) -> FramingStats {
        self.stats
    }

    fn finish(&mut self) -> Option<Vec<u8>> {
        let mut frame = std::mem::take(&mut self.buf);
        let overflowed = std::mem::replace(&mut self.overflowed, false);
        self.escaped = false;

        if overflowed {
            warn!(max = MAX_FRAME_LENGTH, "dropping oversize serial frame");
            self.stats.oversize += 1;
            return None;
        }

        // back-to-back sync bytes
        if frame.is_empty() {
            return None;
        }

        if frame.len() < 3 {
            warn!(len = frame.len(), "dropping truncated serial frame");
            self.stats.runts += 1;
            return None;
        }

        let body_len = frame.len() - 2;
        let received = u16::from_le_bytes([frame[body_len], frame[body_len + 1]]);
        let computed = CRC16.checksum(&frame[..body_len]);
        if received != computed {
            warn!(received, computed, "dropping serial frame with bad CRC");
            self.stats.crc_errors += 1;
            return None;
        }

        frame.truncate(body_len);
        self.stats.frames += 1;
        Some(frame)
    }
}

/// Frame `payload` for the wire: CRC appended, reserved bytes escaped,
/// wrapped in sync bytes.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let crc = CRC16.checksum(payload).to_le_bytes();

    let mut out = Vec::with_capacity(payload.len() + 6);
    out.push(SYNC);
    for &b in payload.iter().chain(crc.iter()) {
        if b == SYNC || b == ESCAPE {
            out.push(ESCAPE);
            out.push(b ^ XOR);
        } else {
            out.push(b);
        }
    }
    out.push(SYNC);
    out
}
