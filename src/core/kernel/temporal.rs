use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Civil time in the exchange's zone. Every wire time decodes into this type.
pub type Timestamp = DateTime<FixedOffset>;

/// The exchange operates in UTC+09:00 with no daylight saving.
const EXCHANGE_OFFSET_SECONDS: i32 = 9 * 3600;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("{value:?} does not match wire layout {layout}")]
    Layout { layout: &'static str, value: String },
}

/// Fixed zone all wire times are normalized to.
pub fn exchange_zone() -> FixedOffset {
    FixedOffset::east_opt(EXCHANGE_OFFSET_SECONDS).expect("UTC+09:00 is a valid offset")
}

fn localize(naive: NaiveDateTime, layout: &'static str, value: &str) -> Result<Timestamp, TimeError> {
    exchange_zone()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| layout_error(layout, value))
}

fn layout_error(layout: &'static str, value: &str) -> TimeError {
    TimeError::Layout {
        layout,
        value: value.to_string(),
    }
}

/// Compact layouts carry no separators, so their width is checked before chrono
/// gets a chance to accept a shorter field.
fn require_digits(value: &str, width: usize, layout: &'static str) -> Result<(), TimeError> {
    if value.len() == width && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(layout_error(layout, value))
    }
}

/// Separated layouts: `shape` uses `9` for a digit, anything else must match exactly.
/// chrono alone accepts a missing fraction and a space-padded hour.
fn require_shape(value: &str, shape: &str, layout: &'static str) -> Result<(), TimeError> {
    let matches = value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'9' => v.is_ascii_digit(),
            _ => v == s,
        });
    if matches {
        Ok(())
    } else {
        Err(layout_error(layout, value))
    }
}

fn all_zero(value: &str) -> bool {
    value.bytes().all(|b| b == b'0')
}

fn parse_request_time(value: &str) -> Result<Option<Timestamp>, TimeError> {
    if value == "0" {
        return Ok(None);
    }
    require_shape(value, "9999.99.99-99:99:99.999", RequestTime::LAYOUT)?;
    let naive = NaiveDateTime::parse_from_str(value, "%Y.%m.%d-%H:%M:%S%.3f")
        .map_err(|_| layout_error(RequestTime::LAYOUT, value))?;
    localize(naive, RequestTime::LAYOUT, value).map(Some)
}

fn parse_compact_date_time(value: &str) -> Result<Option<Timestamp>, TimeError> {
    require_digits(value, 14, CompactDateTime::LAYOUT)?;
    if all_zero(value) {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
        .map_err(|_| layout_error(CompactDateTime::LAYOUT, value))?;
    localize(naive, CompactDateTime::LAYOUT, value).map(Some)
}

fn parse_date(value: &str) -> Result<Option<Timestamp>, TimeError> {
    require_digits(value, 8, WireDate::LAYOUT)?;
    if all_zero(value) {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|_| layout_error(WireDate::LAYOUT, value))?;
    localize(date.and_time(NaiveTime::MIN), WireDate::LAYOUT, value).map(Some)
}

fn parse_year_month(value: &str) -> Result<Option<Timestamp>, TimeError> {
    require_digits(value, 6, YearMonth::LAYOUT)?;
    if all_zero(value) {
        return Ok(None);
    }
    let (year, month) = value.split_at(4);
    let date = match (year.parse::<i32>(), month.parse::<u32>()) {
        (Ok(year), Ok(month)) => NaiveDate::from_ymd_opt(year, month, 1),
        _ => None,
    }
    .ok_or_else(|| layout_error(YearMonth::LAYOUT, value))?;
    localize(date.and_time(NaiveTime::MIN), YearMonth::LAYOUT, value).map(Some)
}

fn parse_hour_minute(value: &str) -> Result<Option<Timestamp>, TimeError> {
    require_shape(value, "99:99", HourMinute::LAYOUT)?;
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| layout_error(HourMinute::LAYOUT, value))?;
    // Time-of-day values are anchored on 0000-01-01.
    let date = NaiveDate::from_ymd_opt(0, 1, 1)
        .ok_or_else(|| layout_error(HourMinute::LAYOUT, value))?;
    localize(date.and_time(time), HourMinute::LAYOUT, value).map(Some)
}

fn format_time(time: &Timestamp, layout: &str) -> String {
    time.with_timezone(&exchange_zone()).format(layout).to_string()
}

macro_rules! wire_time {
    (
        $(#[$meta:meta])*
        $name:ident, layout = $layout:literal, format = $format:literal, zero = $zero:literal, parse = $parse:path
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(pub Option<Timestamp>);

        impl $name {
            pub const LAYOUT: &'static str = $layout;

            pub fn new(time: Timestamp) -> Self {
                Self(Some(time))
            }

            pub fn time(&self) -> Option<Timestamp> {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_none()
            }

            /// Null and empty input decode to the zero value.
            pub fn decode(text: Option<&str>) -> Result<Self, TimeError> {
                match text {
                    None | Some("") => Ok(Self(None)),
                    Some(text) => $parse(text).map(Self),
                }
            }

            pub fn encode(&self) -> String {
                self.0
                    .map_or_else(|| $zero.to_string(), |time| format_time(&time, $format))
            }
        }

        impl From<Option<Timestamp>> for $name {
            fn from(time: Option<Timestamp>) -> Self {
                Self(time)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.encode())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let text = Option::<String>::deserialize(deserializer)?;
                Self::decode(text.as_deref()).map_err(de::Error::custom)
            }
        }
    };
}

wire_time! {
    /// Millisecond send/receive time carried in every envelope.
    /// Unlike the other shapes its zero value is written as `"0"`.
    RequestTime,
    layout = "YYYY.MM.DD-HH:MM:SS.mmm",
    format = "%Y.%m.%d-%H:%M:%S%.3f",
    zero = "0",
    parse = parse_request_time
}

wire_time! {
    /// `YYYYMMDDHHMMSS`; an all-zero value means "not set".
    CompactDateTime,
    layout = "YYYYMMDDHHMMSS",
    format = "%Y%m%d%H%M%S",
    zero = "",
    parse = parse_compact_date_time
}

wire_time! {
    YearMonth,
    layout = "YYYYMM",
    format = "%Y%m",
    zero = "",
    parse = parse_year_month
}

wire_time! {
    /// Time of day, anchored on 0000-01-01 in the exchange zone.
    HourMinute,
    layout = "HH:MM",
    format = "%H:%M",
    zero = "",
    parse = parse_hour_minute
}

impl RequestTime {
    pub fn now() -> Self {
        Self(Some(Utc::now().with_timezone(&exchange_zone())))
    }
}

/// `YYYYMMDD` date with the two order-entry markers layered on top.
///
/// `no_change` (`"*"`) asks an amendment to leave the field alone and wins over
/// `today` (`"0"`), which asks for the business day the order executes on.
/// Neither flag is ever set by decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WireDate {
    pub time: Option<Timestamp>,
    pub today: bool,
    pub no_change: bool,
}

impl WireDate {
    pub const LAYOUT: &'static str = "YYYYMMDD";

    pub fn new(time: Timestamp) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn today() -> Self {
        Self {
            today: true,
            ..Self::default()
        }
    }

    pub fn no_change() -> Self {
        Self {
            no_change: true,
            ..Self::default()
        }
    }

    pub fn time(&self) -> Option<Timestamp> {
        self.time
    }

    pub fn decode(text: Option<&str>) -> Result<Self, TimeError> {
        match text {
            None | Some("") => Ok(Self::default()),
            Some(text) => parse_date(text).map(|time| Self {
                time,
                ..Self::default()
            }),
        }
    }

    pub fn encode(&self) -> String {
        if self.no_change {
            return "*".to_string();
        }
        if self.today {
            return "0".to_string();
        }
        self.time
            .map_or_else(String::new, |time| format_time(&time, "%Y%m%d"))
    }
}

impl From<Option<Timestamp>> for WireDate {
    fn from(time: Option<Timestamp>) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }
}

impl Serialize for WireDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for WireDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        Self::decode(text.as_deref()).map_err(de::Error::custom)
    }
}
