use num_bigint::BigUint;
use num_traits::{One, Zero};
use rust_decimal::Decimal;

/// Decimal digits of `2^256 - 1`; no on-chain amount is longer.
pub const MAX_UINT_DIGITS: usize = 78;

/// Parses a human-readable decimal string (`"1234.5678"`) into raw units of a
/// token with `decimals` decimals. Digits beyond `decimals` are truncated.
///
/// Returns `None` for negative, empty or malformed input, and for values
/// with more than [`MAX_UINT_DIGITS`] integer digits in raw units.
pub fn parse_units(value: &str, decimals: u8) -> Option<BigUint> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('-') {
        return None;
    }
    let value = value.strip_prefix('+').unwrap_or(value);

    // Exponent notation shows up in some indexer payloads for dust balances.
    let (mantissa, exponent) = match value.find(['e', 'E']) {
        Some(pos) => (&value[..pos], value[pos + 1..].parse::<i32>().ok()?),
        None => (value, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(BigUint::zero());
    }

    // The digits carry `frac_part.len()` decimals; rescale to `decimals`.
    let shift = i64::from(decimals) + i64::from(exponent) - frac_part.len() as i64;
    if shift >= 0 {
        let shift = usize::try_from(shift).ok()?;
        if digits.len().saturating_add(shift) > MAX_UINT_DIGITS {
            return None;
        }
        let raw = BigUint::parse_bytes(digits.as_bytes(), 10)?;
        Some(raw * pow10(u32::try_from(shift).ok()?))
    } else {
        let cut = usize::try_from(shift.unsigned_abs()).ok()?;
        if cut >= digits.len() {
            return Some(BigUint::zero());
        }
        BigUint::parse_bytes(digits[..digits.len() - cut].as_bytes(), 10)
    }
}

/// Formats raw units as a decimal string with `decimals` fractional digits,
/// trimming trailing zeros.
#[must_use]
pub fn format_units(raw: &BigUint, decimals: u8) -> String {
    let digits = raw.to_str_radix(10);
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// `floor(amount · fraction)` with exact rational arithmetic. Negative fractions yield zero.
#[must_use]
pub fn mul_decimal_floor(amount: &BigUint, fraction: Decimal) -> BigUint {
    if fraction.is_sign_negative() || fraction.is_zero() {
        return BigUint::zero();
    }
    let mantissa = BigUint::from(fraction.mantissa().unsigned_abs());
    amount * mantissa / pow10(fraction.scale())
}

/// `10^exp` as an arbitrary-precision integer.
#[must_use]
pub fn pow10(exp: u32) -> BigUint {
    if exp == 0 {
        return BigUint::one();
    }
    BigUint::from(10u32).pow(exp)
}

/// Serde adapter encoding `BigUint` as a decimal string.
pub mod biguint_string {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid integer string {s:?}")))
    }
}

/// Serde adapter encoding `Vec<BigUint>` as decimal strings.
pub mod biguint_vec_string {
    use num_bigint::BigUint;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[BigUint], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_str_radix(10))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<BigUint>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| {
                BigUint::parse_bytes(s.as_bytes(), 10)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid integer string {s:?}")))
            })
            .collect()
    }
}
