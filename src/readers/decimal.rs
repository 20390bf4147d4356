//! NUMERIC scalar reader and the decimal encoder it shares with the parameter side.
//!
//! The wire format is PostgreSQL's base-10000 ("NBASE") representation: a header of
//! `(ndigits, weight, sign, dscale)` followed by `ndigits` base-10000 digit groups.
//! Decode expands each wire digit into four base-10 digits and truncates/pads the
//! stream to `dscale + (weight + 1) * 4` digits before handing it to
//! `rust_decimal::Decimal`; encode runs the same alignment in reverse.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{DataError, ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::Value;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
/// PostgreSQL >= 14 numeric infinities, handled symmetrically with `NUMERIC_NAN`.
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Expand wire digit groups into base-10 digits, truncated/padded to exactly
/// `ndigits` entries.
fn expand_digits(pg_digits: &[u16], ndigits: usize) -> Result<Vec<u8>> {
    let mut digits = Vec::with_capacity(ndigits);
    'outer: for &dg in pg_digits {
        if dg > 9999 {
            return Err(ProtocolError::InvalidNumericDigit { digit: dg }.into());
        }
        for val in [dg / 1000, (dg / 100) % 10, (dg / 10) % 10, dg % 10] {
            if digits.len() == ndigits {
                break 'outer;
            }
            digits.push(val as u8);
        }
    }
    digits.resize(ndigits, 0);
    Ok(digits)
}

fn digits_to_string(negative: bool, digits: &[u8], dscale: usize) -> String {
    let mut s = String::with_capacity(digits.len() + 2);
    if negative {
        s.push('-');
    }
    if digits.is_empty() {
        s.push('0');
    }
    let int_len = digits.len().saturating_sub(dscale);
    if int_len == 0 {
        s.push('0');
    } else {
        for &d in &digits[..int_len] {
            s.push((b'0' + d) as char);
        }
    }
    if dscale > 0 {
        s.push('.');
        for &d in &digits[int_len..] {
            s.push((b'0' + d) as char);
        }
    }
    s
}

pub(crate) fn decimal_from_numeric_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let ndigits_wire = cur.advance_u16()?;
    let weight = cur.advance_i16()?;
    let sign = cur.advance_u16()?;
    let dscale = cur.advance_u16()?;
    if sign == NUMERIC_NAN {
        return Err(DataError::NumericNaNUnsupported.into());
    }
    if sign == NUMERIC_PINF || sign == NUMERIC_NINF {
        return Err(DataError::NumericInfinity.into());
    }
    if sign != NUMERIC_POS && sign != NUMERIC_NEG {
        return Err(ProtocolError::InvalidNumericSign { sign }.into());
    }
    let mut pg_digits = Vec::with_capacity(ndigits_wire as usize);
    for _ in 0..ndigits_wire {
        pg_digits.push(cur.advance_u16()?);
    }
    let ndigits = i64::from(dscale) + (i64::from(weight) + 1) * 4;
    let ndigits = usize::try_from(ndigits.max(0)).unwrap_or(0);
    let digits = expand_digits(&pg_digits, ndigits)?;
    let text = digits_to_string(sign == NUMERIC_NEG, &digits, dscale as usize);
    let decimal = Decimal::from_str_exact(&text).map_err(|_| DataError::NumericPrecisionExceeded(digits.len()))?;
    Ok(Value::Numeric(decimal))
}

pub(crate) fn decimal_from_numeric_text(cur: &mut Cursor<'_>) -> Result<Value> {
    let text = cur.advance_text(cur.remaining())?;
    if text == "NaN" {
        return Err(DataError::NumericNaNUnsupported.into());
    }
    if text == "Infinity" || text == "-Infinity" {
        return Err(DataError::NumericInfinity.into());
    }
    let decimal = Decimal::from_str_exact(text).map_err(|_| DataError::NumericPrecisionExceeded(text.len()))?;
    Ok(Value::Numeric(decimal))
}

/// Encode a `Decimal` into the wire's NBASE-10000 format, mirroring
/// `write_decimal_bin`. `rust_decimal::Decimal` has no NaN/Infinity, so the
/// NaN/Infinity branches of the original algorithm can never be taken here; they are
/// documented, not implemented, per `DataError::NumericNaNUnsupported` /
/// `DataError::NumericInfinity`.
pub fn decimal_to_numeric_binary(val: &Decimal) -> Result<Vec<u8>> {
    let negative = val.is_sign_negative();
    let mantissa = val.mantissa().unsigned_abs();
    let digits: Vec<u8> = if mantissa == 0 {
        vec![0]
    } else {
        mantissa.to_string().bytes().map(|b| b - b'0').collect()
    };
    let dscale = i64::from(val.scale());
    if !(0..=0x3FFF).contains(&dscale) {
        return Err(DataError::NumericExponentOutOfRange(dscale).into());
    }

    let raw_weight = digits.len() as i64 - dscale;
    let quot = raw_weight.div_euclid(4);
    let rest = raw_weight.rem_euclid(4);
    let weight = quot + i64::from(rest > 0) - 1;
    if weight < i64::from(i16::MIN) || weight > i64::from(i16::MAX) {
        return Err(DataError::NumericWeightOutOfRange(weight).into());
    }

    let mut pg_digits: Vec<u16> = Vec::new();
    let mut i = if rest > 0 {
        pg_digits.push(0);
        4 - rest as u32
    } else {
        0
    };
    for &dg in &digits {
        match i {
            0 => pg_digits.push(1000 * u16::from(dg)),
            1 => {
                if let Some(last) = pg_digits.last_mut() {
                    *last += 100 * u16::from(dg);
                }
            }
            2 => {
                if let Some(last) = pg_digits.last_mut() {
                    *last += 10 * u16::from(dg);
                }
            }
            _ => {
                if let Some(last) = pg_digits.last_mut() {
                    *last += u16::from(dg);
                }
                i = 0;
                continue;
            }
        }
        i += 1;
    }

    let sign = if negative { NUMERIC_NEG } else { NUMERIC_POS };
    let ndigits = pg_digits.len();
    let mut buf = Vec::with_capacity(8 + ndigits * 2);
    buf.extend_from_slice(&(ndigits as u16).to_be_bytes());
    buf.extend_from_slice(&(weight as i16).to_be_bytes());
    buf.extend_from_slice(&sign.to_be_bytes());
    buf.extend_from_slice(&dscale.to_be_bytes());
    for d in pg_digits {
        buf.extend_from_slice(&d.to_be_bytes());
    }
    Ok(buf)
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::NUMERIC,
        RegistryEntry {
            text: Some(decimal_from_numeric_text),
            binary: Some(decimal_from_numeric_binary),
            array_element_oid: None,
        },
    );
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::oid::Format;
    use crate::readers::Registry;

    fn encode_pg_numeric(ndigits: u16, weight: i16, sign: u16, dscale: u16, digits: &[u16]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&ndigits.to_be_bytes());
        buf.extend_from_slice(&weight.to_be_bytes());
        buf.extend_from_slice(&sign.to_be_bytes());
        buf.extend_from_slice(&dscale.to_be_bytes());
        for d in digits {
            buf.extend_from_slice(&d.to_be_bytes());
        }
        buf
    }

    #[test]
    fn decodes_a_simple_value() {
        let registry = Registry::new();
        // 123.45600 -> pg_digits [123, 4560], weight 1, dscale 5.
        let bytes = encode_pg_numeric(2, 1, NUMERIC_POS, 5, &[123, 4560]);
        let value = registry.decode(oid::NUMERIC, Format::Binary, &bytes).unwrap();
        assert_eq!(value, Value::Numeric(Decimal::from_str("123.45600").unwrap()));
    }

    #[test]
    fn nan_errors_instead_of_silently_losing_precision() {
        let registry = Registry::new();
        let bytes = encode_pg_numeric(0, 0, NUMERIC_NAN, 0, &[]);
        assert!(registry.decode(oid::NUMERIC, Format::Binary, &bytes).is_err());
    }

    #[test]
    fn infinity_sentinel_errors_rather_than_silently_saturating() {
        let registry = Registry::new();
        let bytes = encode_pg_numeric(0, 0, NUMERIC_PINF, 0, &[]);
        assert!(registry.decode(oid::NUMERIC, Format::Binary, &bytes).is_err());
    }

    #[test]
    fn zero_round_trips() {
        let encoded = decimal_to_numeric_binary(&Decimal::ZERO).unwrap();
        let mut cur = Cursor::new(&encoded);
        let value = decimal_from_numeric_binary(&mut cur).unwrap();
        assert_eq!(value, Value::Numeric(Decimal::ZERO));
    }

    #[test]
    fn negative_scaled_value_round_trips() {
        let original = Decimal::from_str("-42.0700").unwrap();
        let encoded = decimal_to_numeric_binary(&original).unwrap();
        let mut cur = Cursor::new(&encoded);
        let value = decimal_from_numeric_binary(&mut cur).unwrap();
        assert_eq!(value, Value::Numeric(original));
    }

    #[test]
    fn integer_value_round_trips() {
        let original = Decimal::from_str("1000000").unwrap();
        let encoded = decimal_to_numeric_binary(&original).unwrap();
        let mut cur = Cursor::new(&encoded);
        let value = decimal_from_numeric_binary(&mut cur).unwrap();
        assert_eq!(value, Value::Numeric(original));
    }
}
