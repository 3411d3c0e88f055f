use std::fmt;

use macaddr::MacAddr6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Temperature,
    Humidity,
    Light,
    Pir,
    Co2,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::Light,
        Channel::Pir,
        Channel::Co2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Light => "light",
            Channel::Pir => "pir",
            Channel::Co2 => "co2",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Temperature => "C",
            Channel::Humidity => "%RH",
            Channel::Light => "lx",
            Channel::Pir => "#",
            Channel::Co2 => "ppm",
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Channel::Temperature | Channel::Humidity => DataType::Double,
            Channel::Light | Channel::Pir | Channel::Co2 => DataType::Long,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Double,
    Long,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Double => "double",
            DataType::Long => "long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    Double(f64),
    Long(i64),
}

impl ChannelValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ChannelValue::Double(v) => v,
            ChannelValue::Long(v) => v as f64,
        }
    }
}

/// Type-specific part of a mote report, selected by the frame's type tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorPayload {
    /// SHT11 temperature/humidity plus the raw light sensor value.
    TemperatureHumidity {
        temperature_celsius: f64,
        humidity_percent: f64,
        light_lux: u16,
    },
    Motion {
        pir: u16,
    },
    Co2 {
        ppm: u16,
    },
    /// A type tag this receiver does not know; the header is still usable.
    Unknown {
        type_tag: u16,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub serial_id: MacAddr6,

    pub node_id: u16,

    pub sequence: u16,

    pub battery: u16,

    pub payload: SensorPayload,
}

impl Reading {
    /// Values present in this reading, in channel order.
    pub fn channel_values(&self) -> Vec<(Channel, ChannelValue)> {
        match self.payload {
            SensorPayload::TemperatureHumidity {
                temperature_celsius,
                humidity_percent,
                light_lux,
            } => vec![
                (Channel::Temperature, ChannelValue::Double(temperature_celsius)),
                (Channel::Humidity, ChannelValue::Double(humidity_percent)),
                (Channel::Light, ChannelValue::Long(light_lux.into())),
            ],
            SensorPayload::Motion { pir } => vec![(Channel::Pir, ChannelValue::Long(pir.into()))],
            SensorPayload::Co2 { ppm } => vec![(Channel::Co2, ChannelValue::Long(ppm.into()))],
            SensorPayload::Unknown { .. } => Vec::new(),
        }
    }

    pub fn value(&self, channel: Channel) -> Option<ChannelValue> {
        self.channel_values()
            .into_iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(payload: SensorPayload) -> Reading {
        Reading {
            serial_id: MacAddr6::new(1, 2, 3, 4, 5, 6),
            node_id: 7,
            sequence: 42,
            battery: 3000,
            payload,
        }
    }

    #[test]
    fn test_th_channel_values() {
        let r = reading(SensorPayload::TemperatureHumidity {
            temperature_celsius: 21.5,
            humidity_percent: 40.0,
            light_lux: 300,
        });

        assert_eq!(
            r.channel_values(),
            vec![
                (Channel::Temperature, ChannelValue::Double(21.5)),
                (Channel::Humidity, ChannelValue::Double(40.0)),
                (Channel::Light, ChannelValue::Long(300)),
            ]
        );
        assert_eq!(r.value(Channel::Co2), None);
    }

    #[test]
    fn test_single_value_payloads() {
        assert_eq!(
            reading(SensorPayload::Motion { pir: 3 }).value(Channel::Pir),
            Some(ChannelValue::Long(3))
        );
        assert_eq!(
            reading(SensorPayload::Co2 { ppm: 812 }).channel_values(),
            vec![(Channel::Co2, ChannelValue::Long(812))]
        );
    }

    #[test]
    fn test_unknown_payload_has_no_channels() {
        let r = reading(SensorPayload::Unknown { type_tag: 0x99 });
        assert!(r.channel_values().is_empty());
    }

    #[test]
    fn test_channel_metadata() {
        assert_eq!(Channel::Humidity.unit(), "%RH");
        assert_eq!(Channel::Light.data_type(), DataType::Long);
        assert_eq!(Channel::Temperature.data_type().as_str(), "double");
        assert_eq!(Channel::Co2.to_string(), "co2");
    }
}
