//! Date, time, timestamp, interval and the legacy abstime/reltime/tinterval readers.
//!
//! PostgreSQL's epoch is 2000-01-01; dates are a day offset from it, times and
//! timestamps are microseconds. `chrono::NaiveDate`'s representable range is wide but
//! PostgreSQL's DATE/TIMESTAMP domain can still exceed it at the extremes, so
//! `DateValue`/`TimestampValue` carry a PostgreSQL-formatted string instead of
//! failing the read when that happens.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::{DateValue, TimestampValue, Value};

const PG_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(d) => d,
    None => panic!("2000-01-01 is always a valid NaiveDate"),
};

const USECS_PER_SEC: i64 = 1_000_000;
const USECS_PER_DAY: i64 = 86_400_000_000;
const POSTGRES_EPOCH_JDATE: i64 = 2_451_545;
const INVALID_ABSTIME: i32 = 0x7FFF_FFFE;

/// Julian-day arithmetic ported from PostgreSQL's own `j2date`, used only once a date
/// falls outside chrono's representable range and needs a textual fallback.
fn date_vals_from_int(jd: i64) -> (i64, u32, u32) {
    let mut julian = jd + POSTGRES_EPOCH_JDATE + 32044;
    let quad = julian.div_euclid(146_097);
    let extra = julian.rem_euclid(146_097) * 4 + 3;
    julian += 60 + quad * 3 + extra.div_euclid(146_097);
    let (quad, julian2) = (julian.div_euclid(1461), julian.rem_euclid(1461));
    let y0 = julian2 * 4 / 1461;
    let julian2 = (if y0 != 0 {
        (julian2 + 305) % 365
    } else {
        (julian2 + 306) % 366
    }) + 123;
    let y = y0 + quad * 4;
    let year = y - 4800;
    let quad2 = julian2 * 2141 / 65536;
    let day = julian2 - 7834 * quad2 / 256;
    let month = (quad2 + 10) % 12 + 1;
    (year, month as u32, day as u32)
}

/// PostgreSQL's own textual rendering of an out-of-range date: zero-padded to at
/// least 4 digits, with a trailing `" BC"` and no year zero.
fn format_date_out_of_range(year: i64, month: u32, day: u32) -> String {
    if year <= 0 {
        format!("{:04}-{:02}-{:02} BC", 1 - year, month, day)
    } else {
        format!("{year:04}-{month:02}-{day:02}")
    }
}

fn date_from_pg_days(pg_days: i32) -> DateValue {
    let native = if pg_days >= 0 {
        PG_EPOCH.checked_add_days(chrono::Days::new(pg_days as u64))
    } else {
        PG_EPOCH.checked_sub_days(chrono::Days::new((-i64::from(pg_days)) as u64))
    };
    match native {
        Some(d) => DateValue::Native(d),
        None => {
            let (year, month, day) = date_vals_from_int(i64::from(pg_days));
            DateValue::OutOfRange(format_date_out_of_range(year, month, day))
        }
    }
}

fn time_vals_from_int(tm: i64) -> Result<(u32, u32, u32, u32)> {
    let hour = tm.div_euclid(3_600 * USECS_PER_SEC);
    if tm < 0 || hour > 23 {
        return Err(ProtocolError::HourOutOfRange(hour.clamp(0, 255) as u8).into());
    }
    let rest = tm.rem_euclid(3_600 * USECS_PER_SEC);
    let minute = rest.div_euclid(60 * USECS_PER_SEC);
    let rest = rest.rem_euclid(60 * USECS_PER_SEC);
    let second = rest.div_euclid(USECS_PER_SEC);
    let usec = rest.rem_euclid(USECS_PER_SEC);
    Ok((hour as u32, minute as u32, second as u32, usec as u32))
}

fn naive_time_from_usecs(tm: i64) -> Result<NaiveTime> {
    let (hour, minute, second, usec) = time_vals_from_int(tm)?;
    NaiveTime::from_hms_micro_opt(hour, minute, second, usec)
        .ok_or_else(|| ProtocolError::HourOutOfRange(hour as u8).into())
}

fn timestamp_from_usecs(usecs: i64) -> Result<TimestampValue> {
    if usecs == i64::MAX {
        return Ok(TimestampValue::Infinity);
    }
    if usecs == i64::MIN {
        return Ok(TimestampValue::NegInfinity);
    }
    let jd = usecs.div_euclid(USECS_PER_DAY);
    let tm = usecs.rem_euclid(USECS_PER_DAY);
    let time = naive_time_from_usecs(tm)?;
    let jd32 = i32::try_from(jd).ok();
    if let Some(jd32) = jd32 {
        if let DateValue::Native(date) = date_from_pg_days(jd32) {
            return Ok(TimestampValue::Native(NaiveDateTime::new(date, time)));
        }
    }
    let (year, month, day) = date_vals_from_int(jd);
    let date_text = format_date_out_of_range(year, month, day);
    let (date_part, era) = match date_text.strip_suffix(" BC") {
        Some(stripped) => (stripped, " BC"),
        None => (date_text.as_str(), ""),
    };
    Ok(TimestampValue::OutOfRange(format!(
        "{date_part} {:02}:{:02}:{:02}.{:06}{era}",
        time.format("%H"),
        time.format("%M"),
        time.format("%S"),
        time.and_utc().timestamp_subsec_micros(),
    )))
}

fn date_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let pg_days = cur.advance_i32()?;
    let value = match pg_days {
        0x7FFF_FFFF => DateValue::Infinity,
        x if x == -0x8000_0000 => DateValue::NegInfinity,
        _ => date_from_pg_days(pg_days),
    };
    Ok(Value::Date(value))
}

fn time_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let usecs = cur.advance_i64()?;
    Ok(Value::Time(naive_time_from_usecs(usecs)?))
}

fn timetz_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let usecs = cur.advance_i64()?;
    let wire_offset = cur.advance_i32()?;
    let time = naive_time_from_usecs(usecs)?;
    Ok(Value::TimeTz {
        time,
        offset_seconds: -wire_offset,
    })
}

fn timestamp_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let usecs = cur.advance_i64()?;
    Ok(Value::Timestamp(timestamp_from_usecs(usecs)?))
}

fn timestamptz_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let usecs = cur.advance_i64()?;
    Ok(Value::TimestampTz(timestamp_from_usecs(usecs)?))
}

fn interval_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let microseconds = cur.advance_i64()?;
    let days = cur.advance_i32()?;
    let months = cur.advance_i32()?;
    Ok(Value::Interval {
        months,
        days,
        microseconds,
    })
}

fn abstime_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let seconds = cur.advance_i32()?;
    Ok(Value::TimestampTz(abstime_value(seconds)))
}

fn abstime_value(seconds: i32) -> TimestampValue {
    match chrono::DateTime::from_timestamp(i64::from(seconds), 0) {
        Some(dt) => TimestampValue::Native(dt.naive_utc()),
        None => TimestampValue::OutOfRange(seconds.to_string()),
    }
}

fn reltime_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let seconds = cur.advance_i32()?;
    Ok(Value::Interval {
        months: 0,
        days: 0,
        microseconds: i64::from(seconds) * USECS_PER_SEC,
    })
}

/// `status = 1` iff neither endpoint is `INVALID_ABSTIME`; any other combination is a
/// malformed tinterval.
fn tinterval_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let status = cur.advance_i32()?;
    let dt1 = cur.advance_i32()?;
    let dt2 = cur.advance_i32()?;
    let expected_valid = dt1 != INVALID_ABSTIME && dt2 != INVALID_ABSTIME;
    if expected_valid != (status == 1) {
        return Err(ProtocolError::InvalidTintervalStatus { status, dt1, dt2 }.into());
    }
    Ok(Value::TInterval {
        valid: expected_valid,
        first: abstime_value(dt1),
        second: abstime_value(dt2),
    })
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::DATE,
        RegistryEntry {
            text: None,
            binary: Some(date_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::TIME,
        RegistryEntry {
            text: None,
            binary: Some(time_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::TIMETZ,
        RegistryEntry {
            text: None,
            binary: Some(timetz_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::TIMESTAMP,
        RegistryEntry {
            text: None,
            binary: Some(timestamp_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::TIMESTAMPTZ,
        RegistryEntry {
            text: None,
            binary: Some(timestamptz_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::INTERVAL,
        RegistryEntry {
            text: None,
            binary: Some(interval_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::ABSTIME,
        RegistryEntry {
            text: None,
            binary: Some(abstime_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::RELTIME,
        RegistryEntry {
            text: None,
            binary: Some(reltime_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::TINTERVAL,
        RegistryEntry {
            text: None,
            binary: Some(tinterval_binary),
            array_element_oid: None,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Format;
    use crate::readers::Registry;

    #[test]
    fn date_decodes_a_normal_day() {
        let registry = Registry::new();
        let bytes = 8780i32.to_be_bytes(); // 2024-01-15
        let value = registry.decode(oid::DATE, Format::Binary, &bytes).unwrap();
        match value {
            Value::Date(DateValue::Native(d)) => assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn date_infinity_sentinel() {
        let registry = Registry::new();
        let bytes = 0x7FFF_FFFFu32.to_be_bytes();
        let value = registry.decode(oid::DATE, Format::Binary, &bytes).unwrap();
        assert_eq!(value, Value::Date(DateValue::Infinity));
    }

    #[test]
    fn timestamp_infinity_sentinel() {
        let registry = Registry::new();
        let bytes = i64::MAX.to_be_bytes();
        let value = registry.decode(oid::TIMESTAMP, Format::Binary, &bytes).unwrap();
        assert_eq!(value, Value::Timestamp(TimestampValue::Infinity));
    }

    #[test]
    fn time_round_trips_hms() {
        let registry = Registry::new();
        let usecs: i64 = (10 * 3600 + 30 * 60 + 45) * 1_000_000 + 123456;
        let bytes = usecs.to_be_bytes();
        let value = registry.decode(oid::TIME, Format::Binary, &bytes).unwrap();
        assert_eq!(value, Value::Time(NaiveTime::from_hms_micro_opt(10, 30, 45, 123456).unwrap()));
    }

    #[test]
    fn timetz_inverts_the_wire_offset_sign() {
        let registry = Registry::new();
        let mut bytes = 0i64.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(-3600i32).to_be_bytes());
        let value = registry.decode(oid::TIMETZ, Format::Binary, &bytes).unwrap();
        match value {
            Value::TimeTz { offset_seconds, .. } => assert_eq!(offset_seconds, 3600),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn interval_reads_months_days_micros() {
        let registry = Registry::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1_500_000i64.to_be_bytes());
        bytes.extend_from_slice(&10i32.to_be_bytes());
        bytes.extend_from_slice(&2i32.to_be_bytes());
        let value = registry.decode(oid::INTERVAL, Format::Binary, &bytes).unwrap();
        assert_eq!(
            value,
            Value::Interval {
                months: 2,
                days: 10,
                microseconds: 1_500_000
            }
        );
    }

    #[test]
    fn tinterval_valid_status_matches_endpoints() {
        let registry = Registry::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&100i32.to_be_bytes());
        let value = registry.decode(oid::TINTERVAL, Format::Binary, &bytes).unwrap();
        match value {
            Value::TInterval { valid, .. } => assert!(valid),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tinterval_status_mismatch_errors() {
        let registry = Registry::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&100i32.to_be_bytes());
        assert!(registry.decode(oid::TINTERVAL, Format::Binary, &bytes).is_err());
    }

    #[test]
    fn out_of_range_bc_timestamp_keeps_its_era_suffix() {
        // A day count still within i32's range but far enough before 2000-01-01
        // that the resulting year falls outside chrono's representable range
        // (and, being this far back, lands in BC), forcing the textual
        // out-of-range path.
        let jd: i64 = -100_000_000;
        let usecs = jd * USECS_PER_DAY;
        match timestamp_from_usecs(usecs).unwrap() {
            TimestampValue::OutOfRange(text) => assert!(text.ends_with(" BC"), "missing era suffix: {text:?}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
