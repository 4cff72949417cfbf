use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Grouping key used for wells whose `wellData.Region` is missing, null or blank.
pub const UNKNOWN_REGION: &str = "Unknown";

/// JSON envelope returned by the suggest endpoint.
///
/// `ok` defaults to `false` so that gateway error bodies such as
/// `{"message":"Forbidden"}` are treated as rejections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub payload: Option<Payload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub wells: Vec<Well>,
}

/// One well record. Only `uuid` and `wellData.Region` are interpreted;
/// everything else passes through in its original order.
///
/// A numeric `uuid` is kept as its decimal text. A null `wellData` reads as
/// empty, and `Region` keeps whatever JSON value the API sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Well {
    #[serde(deserialize_with = "de_string_from_string_or_number")]
    pub uuid: String,
    #[serde(rename = "wellData", default, deserialize_with = "de_null_as_default")]
    pub well_data: WellData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WellData {
    #[serde(rename = "Region", default, skip_serializing_if = "Value::is_null")]
    pub region: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Serde helper: accept an identifier given as a JSON string or number.
fn de_string_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or number identifier")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Serde helper: read `null` as `T::default()`.
fn de_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Well {
    /// The region this well is grouped under. Numbers and booleans are used
    /// as text; null, blank or structured values fall back to [`UNKNOWN_REGION`].
    pub fn region_key(&self) -> Cow<'_, str> {
        match &self.well_data.region {
            Value::String(s) if !s.trim().is_empty() => Cow::Borrowed(s.trim()),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            _ => Cow::Borrowed(UNKNOWN_REGION),
        }
    }
}

/// A well paired with the search string that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchedWell<'a> {
    pub well: &'a Well,
    pub search: &'a str,
}

/// Result of a successful suggest call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub wells: Vec<Well>,
    pub message: Option<String>,
}

impl Suggestions {
    pub fn count(&self) -> usize {
        self.wells.len()
    }
}

/// Wells sharing one region key, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: String,
    pub wells: Vec<SearchedWell<'a>>,
}

/// Normalized rows for one group, ready for a spreadsheet writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Cell at `(row, column name)`, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportGroup {
    pub key: String,
    pub table: Table,
}

/// Ordered `(key, rows)` groups handed to the writer in a single call.
pub type ExportPayload = Vec<ExportGroup>;
