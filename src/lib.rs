//! well_search
//!
//! A small Rust library for searching well records through a suggestion API
//! and exporting them, grouped by region, to a spreadsheet. Pairs with the
//! `wells` CLI.
//!
//! ### Features
//! - Timeout-bounded suggest requests with a sanitized query and API key header
//! - Stable grouping by `wellData.Region`, with a sentinel for missing regions
//! - One export path for single wells and whole result lists (XLSX or CSV)
//! - An I/O-free session state machine that discards superseded responses
//!
//! ### Example
//! ```no_run
//! use well_search::{Client, FlattenParser, GroupExporter, storage::XlsxWriter};
//!
//! let client = Client::new("my-api-key", 5000)?;
//! let found = client.suggest("Wel l-42!")?.unwrap_or_default();
//! let mut exporter = GroupExporter::new(FlattenParser, XlsxWriter::new("wells.xlsx"));
//! exporter.export_all(&found.wells, "Wel l-42!")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod error;
pub mod export;
pub mod group;
pub mod models;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod worker;

pub use api::{Client, parse_envelope, sanitize_query};
pub use error::{ExportError, ParseError, SettingsError, SuggestError, WriteError};
pub use export::{ExportOutcome, FlattenParser, GroupExporter, RecordParser, SpreadsheetWriter};
pub use models::{SearchedWell, Suggestions, Well};
pub use session::{Effect, Phase, RequestToken, Session};
pub use settings::Settings;
