use crate::error::WriteError;
use crate::export::SpreadsheetWriter;
use crate::models::ExportPayload;
use csv::WriterBuilder;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SHEET_NAME_MAX: usize = 31;
const SHEET_NAME_ILLEGAL: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Writes one worksheet per group to an `.xlsx` workbook.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    path: PathBuf,
}

/// Writes all groups to a single CSV file with a leading `region` column.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    path: PathBuf,
}

impl XlsxWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsvWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Cut to `max` chars, then drop edge whitespace and apostrophes, which
/// Excel does not allow at either end of a sheet name.
fn clip_sheet_name(name: &str, max: usize) -> String {
    let clipped: String = name.chars().take(max).collect();
    clipped
        .trim_matches(|c: char| c == '\'' || c.is_whitespace())
        .to_string()
}

/// Excel-safe, unique worksheet names for the given group keys.
pub fn sheet_names<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in keys {
        let cleaned: String = key
            .chars()
            .map(|c| if SHEET_NAME_ILLEGAL.contains(&c) { '_' } else { c })
            .collect();
        let mut base = clip_sheet_name(&cleaned, SHEET_NAME_MAX);
        if base.is_empty() {
            base = "Sheet".to_string();
        }

        let taken = |name: &str| out.iter().any(|n| n.to_lowercase() == name.to_lowercase());
        let mut name = base.clone();
        let mut n = 2;
        while taken(&name) {
            let suffix = format!(" ({n})");
            let keep = SHEET_NAME_MAX - suffix.chars().count();
            name = format!("{}{}", clip_sheet_name(&base, keep), suffix);
            n += 1;
        }
        out.push(name);
    }
    out
}

/// Prefix strings that a spreadsheet would read as a formula.
pub fn neutralize_formula(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

fn csv_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => neutralize_formula(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => neutralize_formula(&other.to_string()),
    }
}

/// Temp file next to `path`, so the final rename stays on one filesystem.
fn staging_file(path: &Path) -> Result<NamedTempFile, WriteError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

impl SpreadsheetWriter for XlsxWriter {
    fn write(&mut self, payload: &ExportPayload) -> Result<bool, WriteError> {
        let mut workbook = Workbook::new();
        let names = sheet_names(payload.iter().map(|g| g.key.as_str()));
        for (group, name) in payload.iter().zip(names) {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&name)?;
            for (c, col) in group.table.columns.iter().enumerate() {
                sheet.write_string(0, c as u16, col)?;
            }
            for (r, row) in group.table.rows.iter().enumerate() {
                let r = r as u32 + 1;
                for (c, v) in row.iter().enumerate() {
                    let c = c as u16;
                    match v {
                        Value::Null => {}
                        Value::Bool(b) => {
                            sheet.write_boolean(r, c, *b)?;
                        }
                        Value::Number(n) => match n.as_f64() {
                            Some(f) => {
                                sheet.write_number(r, c, f)?;
                            }
                            None => {
                                sheet.write_string(r, c, n.to_string())?;
                            }
                        },
                        Value::String(s) => {
                            sheet.write_string(r, c, s)?;
                        }
                        other => {
                            sheet.write_string(r, c, other.to_string())?;
                        }
                    }
                }
            }
        }

        let buf = workbook.save_to_buffer()?;
        let mut tmp = staging_file(&self.path)?;
        tmp.write_all(&buf)?;
        tmp.flush()?;
        tmp.persist(&self.path)?;
        Ok(true)
    }
}

impl SpreadsheetWriter for CsvWriter {
    fn write(&mut self, payload: &ExportPayload) -> Result<bool, WriteError> {
        let mut columns: Vec<&str> = Vec::new();
        for g in payload {
            for c in &g.table.columns {
                if !columns.contains(&c.as_str()) {
                    columns.push(c);
                }
            }
        }

        let tmp = staging_file(&self.path)?;
        {
            let mut wtr = WriterBuilder::new().from_writer(tmp.as_file());
            wtr.write_record(std::iter::once("region").chain(columns.iter().copied()))?;
            for g in payload {
                for (r, _) in g.table.rows.iter().enumerate() {
                    let mut record = vec![neutralize_formula(&g.key)];
                    record.extend(
                        columns
                            .iter()
                            .map(|c| g.table.cell(r, c).map(csv_cell).unwrap_or_default()),
                    );
                    wtr.write_record(&record)?;
                }
            }
            wtr.flush()?;
        }
        tmp.persist(&self.path)?;
        Ok(true)
    }
}
