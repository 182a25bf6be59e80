//! JSON helpers shared by the resource models.
//!
//! - [`Timestamp`]: the API's second-resolution UTC timestamps.
//! - [`nullable`]: decoding for update fields that distinguish "absent" from
//!   "explicitly null".

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A point in time as the API writes it: `YYYY-MM-DDTHH:MM:SSZ`.
///
/// The zero value stands for "no time" and is what an empty string decodes
/// to; it encodes back to an empty string, so the textual form survives a
/// round trip either way.
///
/// # Examples
///
/// ```
/// use gsclient::Timestamp;
///
/// let ts: Timestamp = "2024-05-01T09:30:00Z".parse().unwrap();
/// assert_eq!(ts.to_string(), "2024-05-01T09:30:00Z");
/// assert!(Timestamp::default().is_zero());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Option<DateTime<Utc>>);

impl Timestamp {
    /// Wraps a point in time, dropping sub-second precision.
    pub fn new(at: DateTime<Utc>) -> Self {
        let seconds = at.timestamp();
        Self(DateTime::from_timestamp(seconds, 0))
    }

    /// The current time.
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Returns `true` for the zero value.
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the wrapped time, or `None` for the zero value.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::new(at)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)?;
        Ok(Self(Some(naive.and_utc())))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(at) => write!(f, "{}", at.format(TIMESTAMP_FORMAT)),
            None => Ok(()),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(Self::default()),
            Some(raw) => raw.parse().map_err(|e| {
                serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}"))
            }),
        }
    }
}

/// Decodes an update field so that a missing key and an explicit `null` stay distinct.
///
/// Use together with `#[serde(default)]`: a missing key leaves the field at
/// `None`, `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default, deserialize_with = "gsclient::codec::nullable")]
///     template_uuid: Option<Option<String>>,
/// }
///
/// let absent: Patch = serde_json::from_str("{}").unwrap();
/// let cleared: Patch = serde_json::from_str(r#"{"template_uuid":null}"#).unwrap();
/// assert_eq!(absent.template_uuid, None);
/// assert_eq!(cleared.template_uuid, Some(None));
/// ```
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Stamped {
        create_time: Timestamp,
    }

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct LabelPatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        labels: Option<Vec<String>>,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "nullable"
        )]
        template_uuid: Option<Option<String>>,
    }

    #[test]
    fn test_timestamp_round_trip_keeps_text() {
        let text = r#"{"create_time":"2019-04-01T13:02:11Z"}"#;
        let decoded: Stamped = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&decoded).unwrap(), text);
    }

    #[test]
    fn test_empty_timestamp_is_zero() {
        let decoded: Stamped = serde_json::from_str(r#"{"create_time":""}"#).unwrap();
        assert!(decoded.create_time.is_zero());
        assert_eq!(
            serde_json::to_value(&decoded).unwrap(),
            json!({"create_time": ""})
        );

        let decoded: Stamped = serde_json::from_str(r#"{"create_time":null}"#).unwrap();
        assert!(decoded.create_time.is_zero());
    }

    #[test]
    fn test_non_canonical_timestamp_is_rejected() {
        assert!(serde_json::from_str::<Stamped>(r#"{"create_time":"2019-04-01 13:02:11"}"#).is_err());
        assert!("2019-04-01T13:02:11.123Z".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_new_truncates_to_seconds() {
        let at = DateTime::parse_from_rfc3339("2020-01-02T03:04:05.678Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Timestamp::new(at).to_string(), "2020-01-02T03:04:05Z");
    }

    #[test]
    fn test_three_state_fields() {
        let untouched = LabelPatch::default();
        assert_eq!(serde_json::to_value(&untouched).unwrap(), json!({}));

        let cleared = LabelPatch {
            labels: Some(vec![]),
            template_uuid: Some(None),
        };
        let encoded = serde_json::to_value(&cleared).unwrap();
        assert_eq!(encoded, json!({"labels": [], "template_uuid": null}));
        assert_eq!(serde_json::from_value::<LabelPatch>(encoded).unwrap(), cleared);

        let set = LabelPatch {
            labels: Some(vec!["web".into()]),
            template_uuid: Some(Some("abc".into())),
        };
        let encoded = serde_json::to_value(&set).unwrap();
        assert_eq!(serde_json::from_value::<LabelPatch>(encoded).unwrap(), set);
    }
}
