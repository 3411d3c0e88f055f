use macaddr::MacAddr6;
use thiserror::Error;

use crate::keti::{Reading, SensorPayload, Sht11Calibration};

/// Length of a KETI mote packet as handed over by the serial client,
/// including the 9 bytes of serial/AM envelope.
pub const FRAME_LENGTH: usize = 29;

/// Offset of the KETI header; the envelope before it is not interpreted.
pub const HEADER_OFFSET: usize = 9;

pub const TYPE_TH: u16 = 0x64;
pub const TYPE_PIR: u16 = 0x65;
pub const TYPE_CO2: u16 = 0x66;

const TYPE_OFFSET: usize = HEADER_OFFSET;
const SERIAL_ID_OFFSET: usize = HEADER_OFFSET + 2;
const NODE_ID_OFFSET: usize = HEADER_OFFSET + 8;
const SEQUENCE_OFFSET: usize = HEADER_OFFSET + 10;
const BATTERY_OFFSET: usize = HEADER_OFFSET + 12;
const SENSOR_OFFSET: usize = HEADER_OFFSET + 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("bad frame length: expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub type_tag: u16,

    pub serial_id: MacAddr6,

    pub node_id: u16,

    pub sequence: u16,

    pub battery: u16,

    pub sensor_payload: [u8; 6],
}

pub fn decode_header(frame: &[u8]) -> Result<FrameHeader, DecodeError> {
    let frame: &[u8; FRAME_LENGTH] = frame.try_into().map_err(|_| DecodeError::BadLength {
        expected: FRAME_LENGTH,
        actual: frame.len(),
    })?;

    let mut serial_id = [0u8; 6];
    serial_id.copy_from_slice(&frame[SERIAL_ID_OFFSET..SERIAL_ID_OFFSET + 6]);
    let mut sensor_payload = [0u8; 6];
    sensor_payload.copy_from_slice(&frame[SENSOR_OFFSET..SENSOR_OFFSET + 6]);

    Ok(FrameHeader {
        type_tag: read_u16(frame, TYPE_OFFSET),
        serial_id: MacAddr6::from(serial_id),
        node_id: read_u16(frame, NODE_ID_OFFSET),
        sequence: read_u16(frame, SEQUENCE_OFFSET),
        battery: read_u16(frame, BATTERY_OFFSET),
        sensor_payload,
    })
}

pub fn decode_frame(frame: &[u8], calibration: &Sht11Calibration) -> Result<Reading, DecodeError> {
    let header = decode_header(frame)?;

    Ok(Reading {
        serial_id: header.serial_id,
        node_id: header.node_id,
        sequence: header.sequence,
        battery: header.battery,
        payload: decode_payload(header.type_tag, &header.sensor_payload, calibration),
    })
}

pub fn decode_payload(
    type_tag: u16,
    sensor: &[u8; 6],
    calibration: &Sht11Calibration,
) -> SensorPayload {
    match type_tag {
        TYPE_TH => {
            let raw_temperature = read_u16(sensor, 0);
            let raw_humidity = read_u16(sensor, 2);
            let light_lux = read_u16(sensor, 4);

            SensorPayload::TemperatureHumidity {
                temperature_celsius: calibration.temperature_celsius(raw_temperature),
                humidity_percent: calibration.humidity_percent(raw_humidity),
                light_lux,
            }
        }
        TYPE_PIR => SensorPayload::Motion {
            pir: read_u16(sensor, 0),
        },
        TYPE_CO2 => SensorPayload::Co2 {
            ppm: read_u16(sensor, 0),
        },
        type_tag => SensorPayload::Unknown { type_tag },
    }
}

fn read_u16<const N: usize>(buf: &[u8; N], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}
