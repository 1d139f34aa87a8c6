use crate::core::errors::ExchangeError;
use crate::core::kernel::session::Endpoint;
use crate::core::kernel::temporal::RequestTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Operation tag of the record that terminates every event download.
pub const EVENT_DOWNLOAD_COMPLETE: &str = "CLMEventDownloadComplete";

/// Response format flag: descriptive keys, one record per line.
pub const JSON_FORMAT: &str = "5";

/// Header fields embedded in every outgoing record.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    #[serde(rename = "p_no", with = "wire_number")]
    pub request_number: i64,
    #[serde(rename = "p_sd_date")]
    pub sent_at: RequestTime,
    #[serde(rename = "sCLMID")]
    pub clmid: &'static str,
    #[serde(rename = "sJsonOfmt")]
    pub json_format: &'static str,
}

impl RequestEnvelope {
    pub fn new(request_number: i64, clmid: &'static str) -> Self {
        Self {
            request_number,
            sent_at: RequestTime::now(),
            clmid,
            json_format: JSON_FORMAT,
        }
    }
}

/// A complete outgoing record: envelope followed by the operation's own fields.
#[derive(Debug, Serialize)]
pub struct WireRecord<'a, T> {
    #[serde(flatten)]
    pub envelope: RequestEnvelope,
    #[serde(flatten)]
    pub body: &'a T,
}

/// Header fields present on every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "p_no", default, deserialize_with = "wire_number::deserialize")]
    pub request_number: i64,
    #[serde(rename = "p_sd_date", default)]
    pub sent_at: RequestTime,
    #[serde(rename = "p_rv_date", default)]
    pub received_at: RequestTime,
    #[serde(rename = "p_errno", default, deserialize_with = "wire_number::deserialize")]
    pub error_code: i64,
    #[serde(rename = "p_err", default)]
    pub error_message: String,
    #[serde(rename = "sCLMID", default)]
    pub clmid: String,
}

/// A request record shape. Business operations implement this on their wire request.
pub trait WireRequest: Serialize + Send + Sync {
    /// Operation tag sent as `sCLMID`.
    const CLMID: &'static str;
    /// Which of the session's URLs the request goes to.
    const ENDPOINT: Endpoint;
    /// Single response type, or record type for event downloads.
    type Response;
}

/// A single-object response shape and the empty-string fix-ups it needs.
pub trait WireResponse: DeserializeOwned + Send {
    const FIXUPS: &'static [Fixup] = &[];

    fn decode(raw: &str) -> Result<Self, ExchangeError> {
        parse(raw, Self::FIXUPS)
    }
}

/// One record of an event download.
pub trait StreamRecord: Sized + Send {
    fn decode_record(raw: &str) -> Result<Self, ExchangeError>;
}

/// Literal substitution applied to a response before structural decoding.
///
/// The upstream service sends `""` where a number or a list belongs; each fix-up
/// names the exact `"key":""` pair to rewrite, so the same characters elsewhere
/// in the payload are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixup {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

impl Fixup {
    pub const fn new(pattern: &'static str, replacement: &'static str) -> Self {
        Self {
            pattern,
            replacement,
        }
    }
}

/// `"key":""` becomes `"key":"0"`.
macro_rules! fixup_number {
    ($key:literal) => {
        $crate::core::kernel::envelope::Fixup::new(
            concat!("\"", $key, "\":\"\""),
            concat!("\"", $key, "\":\"0\""),
        )
    };
}

/// `"key":""` becomes `"key":[]`.
macro_rules! fixup_list {
    ($key:literal) => {
        $crate::core::kernel::envelope::Fixup::new(
            concat!("\"", $key, "\":\"\""),
            concat!("\"", $key, "\":[]"),
        )
    };
}

pub(crate) use fixup_list;
pub(crate) use fixup_number;

pub fn apply_fixups<'a>(raw: &'a str, fixups: &[Fixup]) -> Cow<'a, str> {
    let mut text = Cow::Borrowed(raw);
    for fixup in fixups {
        if text.contains(fixup.pattern) {
            text = Cow::Owned(text.replace(fixup.pattern, fixup.replacement));
        }
    }
    text
}

/// Apply the fix-up table, then decode. Decode failures surface as `UnmarshalFailed`.
pub fn parse<T: DeserializeOwned>(raw: &str, fixups: &[Fixup]) -> Result<T, ExchangeError> {
    let text = apply_fixups(raw, fixups);
    serde_json::from_str(&text).map_err(ExchangeError::UnmarshalFailed)
}

#[derive(Deserialize)]
struct RecordTag {
    #[serde(rename = "sCLMID", default)]
    clmid: String,
}

/// Read only the operation tag of a raw record.
pub fn record_tag(raw: &str) -> Result<String, ExchangeError> {
    serde_json::from_str::<RecordTag>(raw)
        .map(|tag| tag.clmid)
        .map_err(ExchangeError::UnmarshalFailed)
}

pub fn is_event_download_complete(raw: &str) -> Result<bool, ExchangeError> {
    record_tag(raw).map(|tag| tag == EVENT_DOWNLOAD_COMPLETE)
}

/// Integers carried as JSON strings.
pub mod wire_number {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.trim().parse().map_err(de::Error::custom)
    }
}

/// `"1"` / `"0"` flags. An empty value reads as unset.
pub mod wire_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match String::deserialize(deserializer)?.as_str() {
            "1" => Ok(true),
            "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid flag {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct OrderPage {
        #[serde(flatten)]
        envelope: ResponseEnvelope,
        #[serde(rename = "sTotalCount", deserialize_with = "wire_number::deserialize")]
        total: i64,
        #[serde(rename = "aOrders")]
        orders: Vec<serde_json::Value>,
        #[serde(rename = "sMemo")]
        memo: String,
    }

    const FIXUPS: &[Fixup] = &[fixup_number!("sTotalCount"), fixup_list!("aOrders")];

    #[test]
    fn test_fixup_macros_build_exact_pairs() {
        assert_eq!(FIXUPS[0].pattern, r#""sTotalCount":"""#);
        assert_eq!(FIXUPS[0].replacement, r#""sTotalCount":"0""#);
        assert_eq!(FIXUPS[1].replacement, r#""aOrders":[]"#);
    }

    #[test]
    fn test_fixups_rewrite_only_anchored_pairs() {
        let raw = r#"{"p_no":"4","p_errno":"0","sCLMID":"CLMOrderList","sTotalCount":"","aOrders":"","sMemo":""}"#;
        let page: OrderPage = parse(raw, FIXUPS).unwrap();

        assert_eq!(page.total, 0);
        assert!(page.orders.is_empty());
        assert_eq!(page.memo, "");
        assert_eq!(page.envelope.request_number, 4);
        assert_eq!(page.envelope.clmid, "CLMOrderList");
    }

    #[test]
    fn test_fixups_leave_valid_payload_unchanged() {
        let raw = r#"{"sTotalCount":"2","aOrders":[{"id":"1"},{"id":"2"}],"sMemo":"x"}"#;
        assert!(matches!(apply_fixups(raw, FIXUPS), Cow::Borrowed(_)));

        let page: OrderPage = parse(raw, FIXUPS).unwrap();
        let unpatched: OrderPage = parse(raw, &[]).unwrap();
        assert_eq!(page.total, unpatched.total);
        assert_eq!(page.orders, unpatched.orders);
    }

    #[test]
    fn test_missing_fixup_is_unmarshal_failure() {
        let raw = r#"{"sTotalCount":"","aOrders":[],"sMemo":""}"#;
        let result = parse::<OrderPage>(raw, &[]);
        assert!(matches!(result, Err(ExchangeError::UnmarshalFailed(_))));
    }

    #[test]
    fn test_envelope_decodes_times_and_errors() {
        let raw = r#"{"p_no":"12","p_sd_date":"2024.01.04-09:00:00.000","p_rv_date":"2024.01.04-09:00:00.120","p_errno":"-2","p_err":"session expired","sCLMID":"CLMOrderList"}"#;
        let envelope: ResponseEnvelope = parse(raw, &[]).unwrap();

        assert_eq!(envelope.request_number, 12);
        assert_eq!(envelope.error_code, -2);
        assert_eq!(envelope.error_message, "session expired");
        assert_eq!(envelope.received_at.encode(), "2024.01.04-09:00:00.120");
    }

    #[test]
    fn test_request_record_layout() {
        #[derive(Serialize)]
        struct Body {
            #[serde(rename = "sIssueCode")]
            issue_code: String,
        }

        let body = Body {
            issue_code: "6501".to_string(),
        };
        let mut envelope = RequestEnvelope::new(7, "CLMOrderList");
        envelope.sent_at = RequestTime::default();
        let record = WireRecord {
            envelope,
            body: &body,
        };

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"p_no":"7","p_sd_date":"0","sCLMID":"CLMOrderList","sJsonOfmt":"5","sIssueCode":"6501"}"#
        );
    }

    #[test]
    fn test_record_tag_detection() {
        assert!(is_event_download_complete(r#"{"sCLMID":"CLMEventDownloadComplete"}"#).unwrap());
        assert!(!is_event_download_complete(r#"{"sCLMID":"CLMIssueMstKabu","sIssueCode":""}"#).unwrap());
        assert_eq!(record_tag("{}").unwrap(), "");
    }

    #[test]
    fn test_wire_flag_values() {
        #[derive(Deserialize)]
        struct Flags {
            #[serde(deserialize_with = "wire_flag::deserialize")]
            a: bool,
            #[serde(deserialize_with = "wire_flag::deserialize")]
            b: bool,
        }

        let flags: Flags = serde_json::from_str(r#"{"a":"1","b":""}"#).unwrap();
        assert!(flags.a);
        assert!(!flags.b);
        assert!(serde_json::from_str::<Flags>(r#"{"a":"Y","b":"0"}"#).is_err());
    }
}
