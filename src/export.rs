//! Grouped export: tag → group by region → parse each group → one write.
//!
//! Bulk export and single-well export share [`GroupExporter::export_all`];
//! exporting one well is just a one-element slice.
use crate::error::{ExportError, ParseError, WriteError};
use crate::group::{group_by_region, tag};
use crate::models::{ExportGroup, ExportPayload, SearchedWell, Table, Well};
use log::info;
use serde_json::{Map, Value};

/// Normalizes a batch of wells from one region into table rows.
pub trait RecordParser {
    fn parse(&self, group: &[SearchedWell<'_>]) -> Result<Table, ParseError>;
}

impl<P: RecordParser + ?Sized> RecordParser for &P {
    fn parse(&self, group: &[SearchedWell<'_>]) -> Result<Table, ParseError> {
        (**self).parse(group)
    }
}

/// Receives the whole grouped payload in one call.
///
/// `Ok(true)` means a file was created. `Ok(false)` means the writer chose not
/// to create one, which the exporter reports as an error.
pub trait SpreadsheetWriter {
    fn write(&mut self, payload: &ExportPayload) -> Result<bool, WriteError>;
}

impl<W: SpreadsheetWriter + ?Sized> SpreadsheetWriter for &mut W {
    fn write(&mut self, payload: &ExportPayload) -> Result<bool, WriteError> {
        (**self).write(payload)
    }
}

impl<W: SpreadsheetWriter + ?Sized> SpreadsheetWriter for Box<W> {
    fn write(&mut self, payload: &ExportPayload) -> Result<bool, WriteError> {
        (**self).write(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The input was empty; the writer was not called.
    NothingToExport,
    Written { groups: usize, rows: usize },
}

/// Flattens each well into dotted column names (`wellData.Region`, ...).
///
/// The first two columns are always `search` and `uuid`. Arrays are kept as
/// compact JSON text. A record with a blank `uuid` is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenParser;

impl FlattenParser {
    fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    Self::flatten_into(&key, v, out);
                }
            }
            Value::Array(_) => {
                out.insert(prefix.to_string(), Value::String(value.to_string()));
            }
            other => {
                out.insert(prefix.to_string(), other.clone());
            }
        }
    }

    fn flatten(record: &SearchedWell<'_>) -> Result<Map<String, Value>, ParseError> {
        let uuid = record.well.uuid.trim();
        if uuid.is_empty() {
            return Err(ParseError {
                uuid: record.well.uuid.clone(),
                reason: "record has no identifier".to_string(),
            });
        }
        let value = serde_json::to_value(record.well).map_err(|e| ParseError {
            uuid: uuid.to_string(),
            reason: e.to_string(),
        })?;
        let mut flat = Map::new();
        flat.insert("search".to_string(), Value::String(record.search.to_string()));
        Self::flatten_into("", &value, &mut flat);
        Ok(flat)
    }
}

impl RecordParser for FlattenParser {
    fn parse(&self, group: &[SearchedWell<'_>]) -> Result<Table, ParseError> {
        let flat = group
            .iter()
            .map(Self::flatten)
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns: Vec<String> = Vec::new();
        for record in &flat {
            for k in record.keys() {
                if !columns.contains(k) {
                    columns.push(k.clone());
                }
            }
        }
        let rows = flat
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Ok(Table { columns, rows })
    }
}

pub struct GroupExporter<P, W> {
    parser: P,
    writer: W,
}

impl<P: RecordParser, W: SpreadsheetWriter> GroupExporter<P, W> {
    pub fn new(parser: P, writer: W) -> Self {
        Self { parser, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Tag, group and parse without writing anything.
    ///
    /// Groups are parsed one after another; the first parser failure aborts
    /// the whole payload.
    pub fn build_payload(&self, wells: &[Well], search: &str) -> Result<ExportPayload, ExportError> {
        let tagged = tag(wells, search);
        group_by_region(&tagged)
            .into_iter()
            .map(|g| {
                let table = self
                    .parser
                    .parse(&g.wells)
                    .map_err(|source| ExportError::Parse {
                        region: g.key.clone(),
                        source,
                    })?;
                Ok(ExportGroup { key: g.key, table })
            })
            .collect()
    }

    /// Export every well, grouped by region, in a single writer call.
    pub fn export_all(&mut self, wells: &[Well], search: &str) -> Result<ExportOutcome, ExportError> {
        if wells.is_empty() {
            return Ok(ExportOutcome::NothingToExport);
        }
        let payload = self.build_payload(wells, search)?;
        if !self.writer.write(&payload)? {
            return Err(ExportError::WriterDeclined);
        }
        let rows = payload.iter().map(|g| g.table.rows.len()).sum();
        info!("exported {} wells in {} groups", rows, payload.len());
        Ok(ExportOutcome::Written {
            groups: payload.len(),
            rows,
        })
    }

    /// Export a single well; same path as [`export_all`](Self::export_all).
    pub fn export_one(&mut self, well: &Well, search: &str) -> Result<ExportOutcome, ExportError> {
        self.export_all(std::slice::from_ref(well), search)
    }
}
