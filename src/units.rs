use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Millimetres per foot as used on the shop floor.
pub const MM_PER_FOOT: f64 = 304.799_990_25;
pub const INCHES_PER_FOOT: f64 = 12.0;

/// Unit a glass cut is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    #[default]
    Ft,
    Inch,
    Mm,
}

impl MeasureUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasureUnit::Ft => "ft",
            MeasureUnit::Inch => "inch",
            MeasureUnit::Mm => "mm",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureUnit {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ft" => Ok(MeasureUnit::Ft),
            "inch" => Ok(MeasureUnit::Inch),
            "mm" => Ok(MeasureUnit::Mm),
            other => Err(DomainError::validation(format!(
                "unit must be 'ft', 'inch' or 'mm', got '{other}'"
            ))),
        }
    }
}

/// Rounds to a multiple of 0.5 ft.
///
/// A fractional part of 0.1 or more rounds up to the next half foot, anything
/// smaller rounds down. So 2.08 ft becomes 2.0 ft while 2.17 ft becomes 2.5 ft.
pub fn round_to_half_with_rule(value: f64) -> f64 {
    let fraction = value - value.floor();
    if fraction >= 0.1 {
        (value * 2.0).ceil() / 2.0
    } else {
        (value * 2.0).floor() / 2.0
    }
}

pub fn mm_to_square_feet(length_mm: f64, width_mm: f64) -> f64 {
    let length = round_to_half_with_rule(length_mm / MM_PER_FOOT);
    let width = round_to_half_with_rule(width_mm / MM_PER_FOOT);
    length * width
}

pub fn inches_to_square_feet(length_in: f64, width_in: f64) -> f64 {
    let length = round_to_half_with_rule(length_in / INCHES_PER_FOOT);
    let width = round_to_half_with_rule(width_in / INCHES_PER_FOOT);
    length * width
}

/// Billable area of one piece. Feet are taken as measured.
pub fn area_square_feet(length: f64, width: f64, unit: MeasureUnit) -> f64 {
    match unit {
        MeasureUnit::Ft => length * width,
        MeasureUnit::Mm => mm_to_square_feet(length, width),
        MeasureUnit::Inch => inches_to_square_feet(length, width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_fraction_rounds_down() {
        assert_eq!(round_to_half_with_rule(2.05), 2.0);
        assert_eq!(round_to_half_with_rule(4.09), 4.0);
        assert_eq!(round_to_half_with_rule(3.0), 3.0);
    }

    #[test]
    fn larger_fraction_rounds_up() {
        assert_eq!(round_to_half_with_rule(2.1), 2.5);
        assert_eq!(round_to_half_with_rule(2.3), 2.5);
        assert_eq!(round_to_half_with_rule(2.6), 3.0);
        assert_eq!(round_to_half_with_rule(2.55), 3.0);
        assert_eq!(round_to_half_with_rule(2.5), 2.5);
    }

    #[test]
    fn inches_use_rounded_sides() {
        // 24in = 2ft exactly.
        assert_eq!(inches_to_square_feet(24.0, 24.0), 4.0);
        // 25in = 2.083ft rounds down, 26in = 2.167ft rounds up.
        assert_eq!(inches_to_square_feet(25.0, 26.0), 2.0 * 2.5);
    }

    #[test]
    fn millimetres_use_rounded_sides() {
        // 1000mm is about 3.28ft and rounds up to 3.5ft.
        assert_eq!(mm_to_square_feet(1000.0, 1000.0), 12.25);
        // 610mm is just over 2ft, inside the round-down band.
        assert_eq!(mm_to_square_feet(610.0, 610.0), 4.0);
    }

    #[test]
    fn feet_are_not_rounded() {
        assert_eq!(area_square_feet(2.2, 3.0, MeasureUnit::Ft), 2.2 * 3.0);
    }

    #[test]
    fn unit_parsing_rejects_unknown() {
        assert_eq!("mm".parse::<MeasureUnit>().unwrap(), MeasureUnit::Mm);
        assert!("cm".parse::<MeasureUnit>().is_err());
    }
}
