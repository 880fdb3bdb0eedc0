use crate::error::{Error, Result};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, sync::LazyLock};

use super::Monolingual;

const COMMONS_FILE_PATH: &str = "https://commons.wikimedia.org/wiki/Special:FilePath/";

type Decoder = fn(Value) -> Result<DataValue>;

static DECODERS: LazyLock<HashMap<&'static str, Decoder>> = LazyLock::new(|| {
    HashMap::from([
        ("globe-coordinate", decode_globe as Decoder),
        ("quantity", decode_quantity),
        ("time", decode_time),
        ("wikibase-item", decode_item),
        ("wikibase-property", decode_property),
        ("string", decode_string),
        ("external-id", decode_string),
        ("url", decode_string),
        ("commonsMedia", decode_media),
        ("monolingualtext", decode_monolingual),
    ])
});

/// The value of a snak.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum DataValue {
    GlobeCoordinate(GlobeCoordinate),
    Quantity(Quantity),
    Time(Time),
    /// An item id such as `Q42`.
    Item(String),
    /// A property id such as `P31`.
    Property(String),
    String(String),
    CommonsMedia(CommonsMedia),
    Monolingual(Monolingual),
    /// The statement asserts that no value exists.
    NoValue,
    /// A value exists but is not known.
    UnknownValue,
    Unsupported { datatype: String },
}

impl DataValue {
    /// Decodes the `value` of a snak's `datavalue` with the decoder
    /// registered for `datatype`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the value does not have the shape its
    /// datatype requires.
    pub fn decode(datatype: &str, value: Value) -> Result<Self> {
        match DECODERS.get(datatype) {
            Some(decode) => decode(value),
            None => Ok(Self::Unsupported {
                datatype: datatype.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeCoordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub globe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub upper_bound: Option<String>,
    #[serde(default)]
    pub lower_bound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Time {
    /// The timestamp as sent, e.g. `+1952-03-11T00:00:00Z`.
    pub time: Option<String>,
    #[serde(default)]
    pub timezone: Option<i64>,
    #[serde(default)]
    pub before: Option<i64>,
    #[serde(default)]
    pub after: Option<i64>,
    #[serde(default)]
    pub precision: Option<u8>,
    #[serde(rename = "calendarmodel", default)]
    pub calendar: Option<String>,
    /// `time` split into fields, if it is well formed.
    #[serde(skip_deserializing)]
    pub parts: Option<TimeParts>,
}

/// Fields of a `±YYYY-MM-DDThh:mm:ssZ` timestamp.
///
/// Years may have more than four digits. Month and day are zero when the
/// timestamp's precision is coarser than a month or a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeParts {
    pub negative: bool,
    pub year: u64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FromStr for TimeParts {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Decode {
            reason: format!("malformed timestamp `{s}`"),
        };

        let negative = match s.as_bytes().first() {
            Some(b'+') => false,
            Some(b'-') => true,
            _ => return Err(invalid()),
        };
        let (date, time) = s[1..]
            .strip_suffix('Z')
            .and_then(|rest| rest.split_once('T'))
            .ok_or_else(invalid)?;

        let mut date = date.split('-');
        let year = date.next().filter(|y| y.len() >= 4).ok_or_else(invalid)?;
        let year = digits(year).ok_or_else(invalid)?;
        let month = two_digits(date.next()).ok_or_else(invalid)?;
        let day = two_digits(date.next()).ok_or_else(invalid)?;

        let mut time = time.split(':');
        let hour = two_digits(time.next()).ok_or_else(invalid)?;
        let minute = two_digits(time.next()).ok_or_else(invalid)?;
        let second = two_digits(time.next()).ok_or_else(invalid)?;

        if date.next().is_some() || time.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            negative,
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }
}

fn digits<N: FromStr>(s: &str) -> Option<N> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn two_digits(s: Option<&str>) -> Option<u8> {
    s.filter(|s| s.len() == 2).and_then(digits)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonsMedia {
    pub file: String,
    pub url: String,
}

impl CommonsMedia {
    pub fn new(file: impl Into<String>) -> Self {
        let file = file.into();
        let url = format!("{COMMONS_FILE_PATH}{file}");
        Self { file, url }
    }
}

#[derive(Deserialize)]
struct EntityRef {
    #[serde(rename = "numeric-id")]
    numeric_id: u64,
}

fn decode_globe(value: Value) -> Result<DataValue> {
    Ok(DataValue::GlobeCoordinate(serde_json::from_value(value)?))
}

fn decode_quantity(value: Value) -> Result<DataValue> {
    Ok(DataValue::Quantity(serde_json::from_value(value)?))
}

fn decode_time(value: Value) -> Result<DataValue> {
    let mut time: Time = serde_json::from_value(value)?;
    time.parts = time.time.as_deref().and_then(|t| t.parse().ok());
    Ok(DataValue::Time(time))
}

fn decode_item(value: Value) -> Result<DataValue> {
    let entity: EntityRef = serde_json::from_value(value)?;
    Ok(DataValue::Item(format!("Q{}", entity.numeric_id)))
}

fn decode_property(value: Value) -> Result<DataValue> {
    let entity: EntityRef = serde_json::from_value(value)?;
    Ok(DataValue::Property(format!("P{}", entity.numeric_id)))
}

fn decode_string(value: Value) -> Result<DataValue> {
    Ok(DataValue::String(serde_json::from_value(value)?))
}

fn decode_media(value: Value) -> Result<DataValue> {
    let file: String = serde_json::from_value(value)?;
    Ok(DataValue::CommonsMedia(CommonsMedia::new(file)))
}

fn decode_monolingual(value: Value) -> Result<DataValue> {
    Ok(DataValue::Monolingual(serde_json::from_value(value)?))
}
