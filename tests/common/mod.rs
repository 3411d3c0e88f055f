#![allow(dead_code)]

use keti_motes::keti::{FRAME_LENGTH, HEADER_OFFSET};

pub const SERIAL_ID: [u8; 6] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

/// Serial protocol byte, dispatch byte and AM header of a broadcast packet.
pub const ENVELOPE: [u8; HEADER_OFFSET] = [0x45, 0x00, 0xff, 0xff, 0x00, 0x01, 0x14, 0x22, 0x64];

#[derive(Debug, Clone, Copy)]
pub struct FrameSpec {
    pub type_tag: u16,
    pub serial_id: [u8; 6],
    pub node_id: u16,
    pub sequence: u16,
    pub battery: u16,
    pub sensor: [u8; 6],
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            type_tag: 0x64,
            serial_id: SERIAL_ID,
            node_id: 1,
            sequence: 1,
            battery: 0x00ff,
            sensor: th_sensor(2000, 500, 100),
        }
    }
}

impl FrameSpec {
    pub fn build(&self) -> Vec<u8> {
        self.build_with_envelope(&[0; HEADER_OFFSET])
    }

    pub fn build_with_envelope(&self, envelope: &[u8; HEADER_OFFSET]) -> Vec<u8> {
        let mut f = Vec::with_capacity(FRAME_LENGTH);
        f.extend_from_slice(envelope);
        f.extend_from_slice(&self.type_tag.to_be_bytes());
        f.extend_from_slice(&self.serial_id);
        f.extend_from_slice(&self.node_id.to_be_bytes());
        f.extend_from_slice(&self.sequence.to_be_bytes());
        f.extend_from_slice(&self.battery.to_be_bytes());
        f.extend_from_slice(&self.sensor);
        assert_eq!(f.len(), FRAME_LENGTH);
        f
    }
}

pub fn th_sensor(raw_temperature: u16, raw_humidity: u16, light: u16) -> [u8; 6] {
    let mut s = [0u8; 6];
    s[0..2].copy_from_slice(&raw_temperature.to_be_bytes());
    s[2..4].copy_from_slice(&raw_humidity.to_be_bytes());
    s[4..6].copy_from_slice(&light.to_be_bytes());
    s
}

pub fn single_sensor(value: u16) -> [u8; 6] {
    let mut s = [0xaa; 6];
    s[0..2].copy_from_slice(&value.to_be_bytes());
    s
}
