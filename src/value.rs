//! Typed decoding of raw field bytes.

mod text;

use core::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result, window};

/// How the bytes of a field are turned into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Big-endian unsigned integer of one to four bytes.
    Int,
    /// Unix seconds, decoded as [`ValueKind::Int`].
    Date,
    /// Packed BCD `YYYYMMDD`, falling back to [`ValueKind::Date`].
    Birthday,
    /// Text behind a one-byte code page marker.
    String,
    /// Lowercase hex, trailing NUL bytes trimmed.
    Hexadecimal,
    /// Lowercase hex, leading NUL bytes trimmed.
    DailyCounter,
    /// Lowercase hex of every byte, consumed by [`crate::activity`].
    Activities,
}

impl ValueKind {
    /// Name used in field hints.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Date => "date",
            Self::Birthday => "birthday",
            Self::String => "string",
            Self::Hexadecimal => "hexadecimal",
            Self::DailyCounter => "daylicounter",
            Self::Activities => "activities",
        }
    }

    /// Decode raw field bytes as a value of this kind.
    pub fn decode(self, r: &[u8]) -> Result<Value> {
        Ok(match self {
            Self::Int => Value::Int(decode_int(r)?),
            Self::Date => Value::Date(decode_date(r)?),
            Self::Birthday => Value::Date(decode_birthday(r)?),
            Self::String => Value::Text(text::decode(r)?),
            Self::Hexadecimal => {
                let end = r.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                Value::Text(hex::encode(&r[..end]))
            }
            Self::DailyCounter => {
                let start = r.iter().position(|&b| b != 0).unwrap_or(r.len());
                Value::Text(hex::encode(&r[start..]))
            }
            Self::Activities => Value::Text(hex::encode(r)),
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "int" => Self::Int,
            "date" => Self::Date,
            "birthday" => Self::Birthday,
            "string" => Self::String,
            "hexadecimal" => Self::Hexadecimal,
            "daylicounter" => Self::DailyCounter,
            "activites" | "activities" => Self::Activities,
            _ => Err(Error::UnsupportedType(s.to_owned()))?,
        })
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u32),
    Date(DateTime<Utc>),
    Text(String),
}

impl Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
        }
    }
}

/// Convert a decoded [`Value`] into the type of the field receiving it.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(value: &Value, into: &str) -> Error {
    Error::UnsupportedType(format!("{} into {into}", value.kind_name()))
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(mismatch(&other, "u32")),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(t) => Ok(t),
            other => Err(mismatch(&other, "DateTime<Utc>")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(&other, "String")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Some)
    }
}

/// Decode a big-endian unsigned integer of one to four bytes.
pub(crate) fn decode_int(r: &[u8]) -> Result<u32> {
    match *r {
        [] => Err(Error::Truncated {
            offset: 0,
            needed: 1,
            available: 0,
        }),
        [a] => Ok(a.into()),
        [a, b] => Ok(u16::from_be_bytes([a, b]).into()),
        [a, b, c] => Ok(u32::from_be_bytes([0, a, b, c])),
        [a, b, c, d] => Ok(u32::from_be_bytes([a, b, c, d])),
        _ => Err(Error::MalformedLength {
            offset: 0,
            detail: "integer wider than four bytes",
        }),
    }
}

/// Decode Unix seconds. All-zero input is the epoch.
pub(crate) fn decode_date(r: &[u8]) -> Result<DateTime<Utc>> {
    let seconds = decode_int(r)?;
    Ok(DateTime::from_timestamp(seconds.into(), 0).unwrap_or_default())
}

/// Decode a birth date.
///
/// Newer cards store the date as packed BCD digits (`0x19 0x85 0x03 0x21` for
/// 1985-03-21), older ones as Unix seconds. The BCD reading is tried first.
fn decode_birthday(r: &[u8]) -> Result<DateTime<Utc>> {
    let bcd = window(r, 0, 4)?;
    let text = format!("{}-{:02x}-{:02x}", hex::encode(&bcd[..2]), bcd[2], bcd[3]);

    match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        Ok(day) => Ok(day.and_time(NaiveTime::MIN).and_utc()),
        Err(_) => decode_date(r),
    }
}
