use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use num_format::{Locale, ToFormattedString};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use well_search::session::{CONFIRMATION_MESSAGE, Details};
use well_search::settings::Overrides;
use well_search::storage::{CsvWriter, XlsxWriter};
use well_search::worker::SuggestWorker;
use well_search::{
    Client, Effect, ExportError, ExportOutcome, FlattenParser, GroupExporter, Phase, Session,
    Settings, SpreadsheetWriter, Well, stats,
};

#[derive(Parser, Debug)]
#[command(
    name = "wells",
    version,
    about = "Search well records and export them grouped by region"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// API key sent as the x-api-key header
    #[arg(long, global = true, env = "WELLS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Request timeout in milliseconds (default 5000)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// API root URL
    #[arg(long, global = true)]
    api_root: Option<String>,
    /// Extra config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch suggestions once (and optionally export them or print stats).
    Suggest(SuggestArgs),
    /// Interactive search: each line is a new query; `:help` lists commands.
    Search(SearchArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Xlsx,
    Csv,
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// Search text; non-alphanumeric characters are dropped before sending
    query: String,
    /// Export all results to this file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (xlsx or csv). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print the number of wells per region.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Print the wells as JSON instead of a list.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Directory for exported files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, value_enum, default_value = "xlsx")]
    format: OutFormat,
}

const HELP: &str = "\
  <text>       search for <text>
  :select N    choose result N
  :details     show or hide details of the chosen well
  :export      export the chosen well, or all results
  :ok          dismiss the export confirmation
  :reset       start over
  :quit        exit";

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let overrides = Overrides {
        api_key: cli.global.api_key.clone(),
        timeout_ms: cli.global.timeout_ms,
        api_root: cli.global.api_root.clone(),
    };
    let settings =
        Settings::load(cli.global.config.as_deref(), &overrides).context("load settings")?;
    let client = Client::from_settings(&settings).context("build http client")?;
    match cli.cmd {
        Command::Suggest(args) => cmd_suggest(&client, args),
        Command::Search(args) => cmd_search(client, args),
    }
}

fn format_for(path: &Path, explicit: Option<OutFormat>) -> Result<OutFormat> {
    if let Some(f) = explicit {
        return Ok(f);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx")
        .to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" => Ok(OutFormat::Xlsx),
        "csv" => Ok(OutFormat::Csv),
        other => anyhow::bail!("unsupported format: {}", other),
    }
}

fn extension(format: OutFormat) -> &'static str {
    match format {
        OutFormat::Xlsx => "xlsx",
        OutFormat::Csv => "csv",
    }
}

/// `wells-<stamp>.<ext>` in `dir`, with a counter if that name is taken.
fn unique_export_path(dir: &Path, stamp: &str, format: OutFormat) -> PathBuf {
    let ext = extension(format);
    let mut path = dir.join(format!("wells-{stamp}.{ext}"));
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("wells-{stamp}-{n}.{ext}"));
        n += 1;
    }
    path
}

fn default_export_path(dir: &Path, format: OutFormat) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f").to_string();
    unique_export_path(dir, &stamp, format)
}

fn export(
    wells: &[Well],
    search: &str,
    path: &Path,
    format: OutFormat,
) -> Result<ExportOutcome, ExportError> {
    let writer: Box<dyn SpreadsheetWriter> = match format {
        OutFormat::Xlsx => Box::new(XlsxWriter::new(path)),
        OutFormat::Csv => Box::new(CsvWriter::new(path)),
    };
    GroupExporter::new(FlattenParser, writer).export_all(wells, search)
}

fn well_line(i: usize, w: &Well) -> String {
    format!("{:>3}. {}  [{}]", i + 1, w.uuid, w.region_key())
}

fn found_line(n: usize) -> String {
    format!("{} wells found", n.to_formatted_string(&Locale::en))
}

fn cmd_suggest(client: &Client, args: SuggestArgs) -> Result<()> {
    let Some(found) = client.suggest(&args.query)? else {
        eprintln!("Nothing to search for after removing non-alphanumeric characters.");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&found.wells)?);
    } else {
        for (i, w) in found.wells.iter().enumerate() {
            println!("{}", well_line(i, w));
        }
    }
    eprintln!("{}", found_line(found.count()));

    if args.stats {
        for s in stats::region_summary(&found.wells) {
            println!("{}  count={}", s.region, s.count);
        }
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = format_for(path, args.format)?;
        match export(&found.wells, &args.query, path, fmt)? {
            ExportOutcome::Written { groups, rows } => {
                eprintln!("Saved {} rows in {} groups to {}", rows, groups, path.display())
            }
            ExportOutcome::NothingToExport => eprintln!("Nothing to export."),
        }
    }
    Ok(())
}

fn cmd_search(client: Client, args: SearchArgs) -> Result<()> {
    let wait = Duration::from_millis(client.timeout_ms() + 1000);
    let worker = SuggestWorker::new(client);
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut out = io::stdout();

    write!(out, "search> ")?;
    out.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = line.trim();
        let effects = match cmd {
            ":quit" | ":q" => break,
            ":help" => {
                println!("{HELP}");
                Vec::new()
            }
            ":details" => {
                match (session.toggle_details(), session.selected()) {
                    (Phase::Selected { details: Details::Expanded }, Some(w)) => {
                        println!("{}", serde_json::to_string_pretty(w)?)
                    }
                    (Phase::Selected { .. }, _) => println!("details hidden"),
                    _ => println!("no well selected"),
                }
                Vec::new()
            }
            ":export" => session.request_export(),
            ":ok" => {
                session.acknowledge_confirmation();
                Vec::new()
            }
            ":reset" => {
                session.reset();
                println!("Well Search");
                Vec::new()
            }
            _ if cmd.starts_with(":select") => {
                match cmd[":select".len()..].trim().parse::<usize>() {
                    Ok(n) if n > 0 => session.select(n - 1),
                    _ => {
                        println!("usage: :select N");
                        Vec::new()
                    }
                }
            }
            _ => session.on_input(&line),
        };

        for effect in effects {
            match effect {
                Effect::Fetch { token, query } => {
                    worker.submit(token, query);
                    // Drain until the latest request lands or times out.
                    while session.pending().is_some() {
                        match worker.recv_timeout(wait) {
                            Some((t, result)) => {
                                session.on_response(t, result);
                            }
                            None => break,
                        }
                    }
                    if let Some(e) = session.error() {
                        println!("error: {e}");
                    } else {
                        for (i, w) in session.suggestions().iter().enumerate() {
                            println!("{}", well_line(i, w));
                        }
                        println!("{}", found_line(session.suggestions().len()));
                    }
                }
                Effect::WellSelected(well) => {
                    println!("selected {} [{}]", well.uuid, well.region_key());
                }
                Effect::Export { wells, search } => {
                    let path = default_export_path(&args.out_dir, args.format);
                    let result = export(&wells, &search, &path, args.format);
                    session.on_export_finished(&result);
                    match result {
                        Ok(ExportOutcome::Written { .. }) => println!(
                            "{} ({})",
                            session.confirmation().unwrap_or(CONFIRMATION_MESSAGE),
                            path.display()
                        ),
                        Ok(ExportOutcome::NothingToExport) => println!("Nothing to export."),
                        Err(e) => println!("export failed: {e}"),
                    }
                }
            }
        }

        write!(out, "search> ")?;
        out.flush()?;
    }
    Ok(())
}
