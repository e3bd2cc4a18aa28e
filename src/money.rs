use crate::errors::DomainError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest price, payment or measure accepted from a caller (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Rounds to cents, halves away from zero.
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rejects negative amounts and amounts above [`MAX_AMOUNT`].
pub fn check(name: &str, value: Decimal) -> Result<Decimal, DomainError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::validation(format!("{name} cannot be negative")));
    }
    if value > MAX_AMOUNT {
        return Err(DomainError::validation(format!("{name} is too large")));
    }
    Ok(value)
}

/// Lifts a length, area or foot count into decimal space.
pub fn from_measure(value: f64) -> Result<Decimal, DomainError> {
    Decimal::from_f64(value)
        .filter(|measure| measure.abs() <= MAX_AMOUNT)
        .ok_or_else(|| DomainError::validation(format!("{value} is not a usable measure")))
}

/// Checked sum; an overflow is a validation error rather than a panic.
pub fn sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, DomainError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| DomainError::validation("amount is too large"))
}

/// Checked product, unrounded.
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal, DomainError> {
    a.checked_mul(b)
        .ok_or_else(|| DomainError::validation("amount is too large"))
}

/// `qty * rate` rounded to cents.
pub fn extend(qty: Decimal, rate: Decimal) -> Result<Decimal, DomainError> {
    mul(qty, rate).map(round)
}

/// Two decimals with comma thousands separators, e.g. `12,345.60`.
pub fn format(value: Decimal) -> String {
    let rounded = round(value);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

#[cfg(test)]
pub(crate) fn d(text: &str) -> Decimal {
    text.parse().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_by_thousands() {
        assert_eq!(format(Decimal::ZERO), "0.00");
        assert_eq!(format(d("999.5")), "999.50");
        assert_eq!(format(d("1234.5")), "1,234.50");
        assert_eq!(format(d("1234567.891")), "1,234,567.89");
        assert_eq!(format(d("-2500")), "-2,500.00");
        assert_eq!(format(d("-0.001")), "0.00");
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(round(d("2.345")), d("2.35"));
        assert_eq!(round(d("2.344")), d("2.34"));
        assert_eq!(round(d("-2.345")), d("-2.35"));
    }

    #[test]
    fn cents_add_up_exactly() {
        assert_eq!(sum([d("0.1"), d("0.2")]), Ok(d("0.3")));
        assert!(sum([Decimal::MAX, Decimal::ONE]).is_err());
    }

    #[test]
    fn check_bounds_amounts() {
        assert_eq!(check("price", d("12.5")), Ok(d("12.5")));
        assert!(check("price", d("-0.01")).is_err());
        assert!(check("price", MAX_AMOUNT + Decimal::ONE).is_err());
        assert!(check("price", Decimal::ZERO).is_ok());
    }

    #[test]
    fn measures_convert_and_reject_non_finite() {
        assert_eq!(from_measure(12.5), Ok(d("12.5")));
        assert!(from_measure(f64::NAN).is_err());
        assert!(from_measure(f64::INFINITY).is_err());
        assert!(from_measure(1e30).is_err());
    }

    #[test]
    fn extend_rounds_to_cents() {
        assert_eq!(extend(d("3"), d("33.333")), Ok(d("100.00")));
        assert_eq!(extend(d("0.5"), d("0.05")), Ok(d("0.03")));
        assert!(extend(Decimal::MAX, d("2")).is_err());
    }
}
