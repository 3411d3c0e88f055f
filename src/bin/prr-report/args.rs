use std::str::FromStr;

use anyhow::{Context as _, Error, bail};
use clap::Parser;

/// A unit of measure and the nominal report period of channels in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPeriod {
    pub unit: String,
    pub period_secs: u32,
}

impl FromStr for UnitPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((unit, period)) = s.rsplit_once(':') else {
            bail!("expected UNIT:SECONDS, got {s}");
        };

        let period_secs: u32 = period
            .parse()
            .with_context(|| format!("invalid report period: {period}"))?;
        if unit.is_empty() || period_secs == 0 {
            bail!("expected UNIT:SECONDS with a non-zero period, got {s}");
        }

        Ok(Self {
            unit: unit.to_string(),
            period_secs,
        })
    }
}

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Length of the window ending now
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub hours: u32,

    /// Units to include, as UNIT:SECONDS
    #[arg(long = "unit", default_values = ["ppm:5", "C:5"])]
    pub units: Vec<UnitPeriod>,

    #[arg(long, default_value_t = 25)]
    pub bins: usize,

    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Print per-channel rates as CSV instead of a histogram
    #[arg(long)]
    pub csv: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unit_period() {
        assert_eq!(
            "ppm:5".parse::<UnitPeriod>().unwrap(),
            UnitPeriod {
                unit: "ppm".to_string(),
                period_secs: 5
            }
        );
        assert_eq!("%RH:10".parse::<UnitPeriod>().unwrap().unit, "%RH");
        assert!("ppm".parse::<UnitPeriod>().is_err());
        assert!("ppm:0".parse::<UnitPeriod>().is_err());
        assert!(":5".parse::<UnitPeriod>().is_err());
        assert!("ppm:x".parse::<UnitPeriod>().is_err());
    }
}
