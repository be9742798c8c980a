//! Raw tabular records as handed over by ingestion collaborators.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// A single cell of a raw record.
///
/// Serialized as a bare scalar: `null`, a JSON number or a string. A number
/// that a float cannot hold exactly is written as its decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellValue {
    /// Missing or null cell.
    #[default]
    Absent,
    /// Value that arrived already typed as a number.
    Number(Decimal),
    /// Any textual value, unparsed.
    Text(String),
}

static ABSENT: CellValue = CellValue::Absent;

impl CellValue {
    /// Create a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Check if the cell holds no value.
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Render the cell as text. Absent cells render as the empty string and
    /// numbers in their shortest decimal form (`1.0` -> `"1"`).
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Absent => Cow::Borrowed(""),
            CellValue::Number(n) => Cow::Owned(n.normalize().to_string()),
            CellValue::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// The number as a float when the float holds it exactly.
pub(crate) fn exact_f64(n: &Decimal) -> Option<f64> {
    let n = n.normalize();
    n.to_f64().filter(|f| f.to_string() == n.to_string())
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Number(value)
    }
}

impl From<Option<Decimal>> for CellValue {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(CellValue::Absent, CellValue::Number)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(Decimal::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Decimal::from_f64(value).map_or(CellValue::Absent, CellValue::Number)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Absent => serializer.serialize_none(),
            CellValue::Number(n) => {
                let n = n.normalize();
                if n.scale() == 0 {
                    if let Some(i) = n.to_i64() {
                        return serializer.serialize_i64(i);
                    }
                }
                match exact_f64(&n) {
                    Some(f) => serializer.serialize_f64(f),
                    None => serializer.serialize_str(&n.to_string()),
                }
            }
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = CellValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("null, a number, a string or a boolean")
            }

            fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
                Ok(CellValue::Absent)
            }

            fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
                Ok(CellValue::Absent)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<CellValue, D::Error> {
                CellValue::deserialize(d)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
                Ok(CellValue::Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
                Ok(CellValue::Number(Decimal::from(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
                Ok(CellValue::Number(Decimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
                // NaN and infinities have no decimal form.
                Ok(CellValue::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
                Ok(CellValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<CellValue, E> {
                Ok(CellValue::Text(v))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// One row: column name to raw cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, CellValue>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Option<CellValue> {
        self.0.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    /// Cell value for `column`, treating a missing column as absent.
    pub fn value(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&ABSENT)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Ordered sequence of records sharing a nominal schema.
///
/// The schema is the union of all columns in first-seen order. Record order
/// is insertion order and is kept through classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<RawRecord>")]
pub struct RecordSet {
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl RecordSet {
    /// Create an empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record set with a fixed column order.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for column in columns {
            set.add_column(column);
        }
        set
    }

    /// Build a record set, deriving the schema from the records.
    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.push(record);
        }
        set
    }

    /// Concatenate several sources into one record set.
    pub fn concat(sets: impl IntoIterator<Item = RecordSet>) -> Self {
        let mut out = Self::new();
        for set in sets {
            out.extend(set);
        }
        out
    }

    /// Append a record, extending the schema with any unseen column.
    pub fn push(&mut self, record: RawRecord) {
        for column in record.columns() {
            if !self.has_column(column) {
                self.columns.push(column.to_string());
            }
        }
        self.records.push(record);
    }

    /// Append all records of `other`, merging its schema after ours.
    pub fn extend(&mut self, other: RecordSet) {
        for column in other.columns {
            self.add_column(column);
        }
        self.records.extend(other.records);
    }

    /// Add a column to the schema if not already present.
    pub fn add_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.has_column(&column) {
            self.columns.push(column);
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the set as CSV: a header row in schema order, one line per record.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.columns.is_empty() {
            return Ok(());
        }

        wtr.write_record(&self.columns)?;
        for record in &self.records {
            wtr.write_record(
                self.columns
                    .iter()
                    .map(|c| record.value(c).as_text().into_owned()),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render the set as a CSV string.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl From<Vec<RawRecord>> for RecordSet {
    fn from(records: Vec<RawRecord>) -> Self {
        Self::from_records(records)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a RawRecord;
    type IntoIter = std::slice::Iter<'a, RawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Row-major view used for serialization: one flat object per record,
/// keys in schema order, missing cells as `null`.
struct Row<'a> {
    columns: &'a [String],
    record: &'a RawRecord,
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.record.value(column))?;
        }
        map.end()
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(&Row {
                columns: &self.columns,
                record,
            })?;
        }
        seq.end()
    }
}
