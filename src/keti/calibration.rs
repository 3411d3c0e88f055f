/// SHT11 conversion coefficients.
///
/// Temperature is the linear 14-bit conversion `D1 + D2 * raw`. Relative
/// humidity is the 12-bit linearization `C1 + C2 * raw + C3 * raw^2` without
/// temperature compensation; indoor temperatures sit close enough to the
/// 25 °C reference point of the datasheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sht11Calibration {
    pub d1: f64,
    pub d2: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl Sht11Calibration {
    pub const DATASHEET: Self = Self {
        d1: -40.1,
        d2: 0.01,
        c1: -4.0,
        c2: 0.0405,
        c3: -2.8e-6,
    };

    pub fn temperature_celsius(&self, raw: u16) -> f64 {
        self.d1 + self.d2 * raw as f64
    }

    pub fn humidity_percent(&self, raw: u16) -> f64 {
        let raw = raw as f64;
        self.c1 + self.c2 * raw + self.c3 * raw.powi(2)
    }
}

impl Default for Sht11Calibration {
    fn default() -> Self {
        Self::DATASHEET
    }
}
