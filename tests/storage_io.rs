use serde_json::json;
use std::fs;
use std::io::Read;
use well_search::models::{ExportGroup, ExportPayload, Table};
use well_search::storage::{CsvWriter, XlsxWriter};
use well_search::{FlattenParser, GroupExporter, SpreadsheetWriter, Well};

fn sample() -> Vec<Well> {
    serde_json::from_value(json!([
        {"uuid": "w-1", "wellData": {"Region": "TX", "Depth": 1200}},
        {"uuid": "w-2", "wellData": {"Region": "OK"}, "operator": "Acme"},
        {"uuid": "w-3", "wellData": {"Region": "TX", "Depth": 900}}
    ]))
    .unwrap()
}

#[test]
fn csv_export_has_region_column_and_one_row_per_well() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wells.csv");
    let mut exporter = GroupExporter::new(FlattenParser, CsvWriter::new(&path));
    exporter.export_all(&sample(), "W").unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "region");
    assert!(headers.iter().any(|h| h == "wellData.Depth"));
    assert!(headers.iter().any(|h| h == "operator"));

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    let regions: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    // grouped: both TX wells first, then OK
    assert_eq!(regions, ["TX", "TX", "OK"]);
}

#[test]
fn xlsx_export_writes_a_workbook_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wells.xlsx");
    let mut exporter = GroupExporter::new(FlattenParser, XlsxWriter::new(&path));
    exporter.export_all(&sample(), "W").unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

fn xlsx_part(path: &std::path::Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn xlsx_export_has_one_sheet_per_region_with_headers_and_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wells.xlsx");
    let mut exporter = GroupExporter::new(FlattenParser, XlsxWriter::new(&path));
    exporter.export_all(&sample(), "W").unwrap();

    let workbook = xlsx_part(&path, "xl/workbook.xml");
    let tx = workbook.find(r#"name="TX""#).expect("TX sheet");
    let ok = workbook.find(r#"name="OK""#).expect("OK sheet");
    assert!(tx < ok, "sheets follow first-seen region order");
    assert_eq!(workbook.matches("<sheet ").count(), 2);

    let strings = xlsx_part(&path, "xl/sharedStrings.xml");
    for s in ["search", "uuid", "wellData.Region", "wellData.Depth", "w-1", "w-3", "operator", "Acme"] {
        assert!(strings.contains(&format!(">{s}<")), "missing string {s}");
    }

    // TX sheet carries both TX wells' depths as numbers
    let sheet1 = xlsx_part(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet1.contains("<v>1200</v>"), "{sheet1}");
    assert!(sheet1.contains("<v>900</v>"), "{sheet1}");
    // header row plus two wells
    assert_eq!(sheet1.matches("<row ").count(), 3);

    let sheet2 = xlsx_part(&path, "xl/worksheets/sheet2.xml");
    assert_eq!(sheet2.matches("<row ").count(), 2);
}

#[test]
fn failed_write_does_not_leave_a_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("wells.xlsx");
    let mut exporter = GroupExporter::new(FlattenParser, XlsxWriter::new(&path));
    assert!(exporter.export_all(&sample(), "W").is_err());
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

//test if the CSV file is save and won't include executable formulas
//the CSV file can be opened in Excel and formulas would be evaluated,
//so cells starting with = + - @ are prefixed with a single quote
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let payload: ExportPayload = vec![ExportGroup {
        key: "@region".into(),
        table: Table {
            columns: vec!["search".into(), "uuid".into(), "note".into()],
            rows: vec![vec![
                json!("=HYPERLINK(\"http://evil\")"),
                json!("+SUM(A1:A9)"),
                json!("plain"),
            ]],
        },
    }];

    let dir = tempfile::tempdir().unwrap();
    let tmp = dir.path().join("csv_injection.csv");
    CsvWriter::new(&tmp).write(&payload).unwrap();

    let mut rdr = csv::Reader::from_path(&tmp).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let row = rdr.records().next().expect("one data row expected").unwrap();
    let cell = |name: &str| {
        let idx = headers
            .iter()
            .position(|h| h == name)
            .expect("header present");
        row.get(idx).unwrap().to_string()
    };

    assert_eq!(cell("region"), "'@region");
    assert_eq!(cell("search"), "'=HYPERLINK(\"http://evil\")");
    assert_eq!(cell("uuid"), "'+SUM(A1:A9)");
    assert_eq!(cell("note"), "plain");
}
