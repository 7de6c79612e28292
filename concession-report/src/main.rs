mod reports;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use concession_core::{ReportConfig, ReportContext, Selection, VegetationIndex};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use source::JsonDirSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored text for a terminal
    Console,
    /// Structured report for other renderers
    Json,
    /// Markdown document
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexArg {
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Enhanced Vegetation Index
    Evi,
}

impl From<IndexArg> for VegetationIndex {
    fn from(value: IndexArg) -> Self {
        match value {
            IndexArg::Ndvi => Self::Ndvi,
            IndexArg::Evi => Self::Evi,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "concession-report", version)]
#[command(about = "Environmental indicator report for a land concession")]
struct Args {
    /// Directory holding the JSON tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Optional JSON report configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Concession (hunting block) to report on
    #[arg(long)]
    block: Option<String>,

    /// List all concessions and exit
    #[arg(long)]
    list_blocks: bool,

    /// Vegetation index to plot
    #[arg(long, value_enum, default_value_t = IndexArg::Ndvi)]
    vegetation_index: IndexArg,

    /// Evapotranspiration moving average window (samples on either side); defaults to the configured value
    #[arg(long)]
    window: Option<usize>,

    /// Weather variable to include
    #[arg(long)]
    weather_variable: Option<String>,

    /// Weather trend moving average window; defaults to the configured value
    #[arg(long)]
    weather_window: Option<usize>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_ref())?;
    let source = JsonDirSource::new(&args.data_dir);
    let ctx = ReportContext::load(&source, config)
        .with_context(|| format!("loading tables from {}", source.dir().display()))?;

    if maybe_list_blocks(&args, &ctx)? {
        return Ok(());
    }

    let selection = build_selection(&args, &ctx)?;
    log::info!("reporting on {}", selection.concession);
    check_weather_variable(&ctx, &selection)
        .with_context(|| format!("building report for {}", selection.concession))?;
    let report = ctx
        .report(&selection)
        .with_context(|| format!("building report for {}", selection.concession))?;

    let mut out = open_output(args.output.as_deref())?;
    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut out, &report)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut out, &report)?,
        ReportFormat::Console => reports::generate_console_report(&mut out, &report)?,
    }
    out.flush()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ReportConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn maybe_list_blocks(args: &Args, ctx: &ReportContext) -> Result<bool> {
    if !args.list_blocks {
        return Ok(false);
    }
    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "Available concessions:")?;
    for name in ctx.concession_names() {
        writeln!(out, "  {name}")?;
    }
    out.flush()?;
    Ok(true)
}

fn build_selection(args: &Args, ctx: &ReportContext) -> Result<Selection> {
    let Some(block) = args.block.as_deref() else {
        eprintln!(
            "{}",
            "⚠️  No concession selected; pass --block or --list-blocks".yellow()
        );
        anyhow::bail!("missing --block");
    };
    let mut selection = Selection::new(block, ctx.config());
    selection.vegetation_index = args.vegetation_index.into();
    if let Some(window) = args.window {
        selection.evapotranspiration_window = window;
    }
    selection.weather_variable.clone_from(&args.weather_variable);
    if let Some(window) = args.weather_window {
        selection.weather_window = window;
    }
    Ok(selection)
}

/// Fail early, naming the alternatives, when the requested weather variable
/// was never observed for the selected concession.
fn check_weather_variable(ctx: &ReportContext, selection: &Selection) -> Result<()> {
    let Some(variable) = selection.weather_variable.as_deref() else {
        return Ok(());
    };
    let available = ctx.concession(&selection.concession)?.weather_variables();
    if available.iter().any(|name| name == variable) {
        return Ok(());
    }
    let listed = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };
    anyhow::bail!("unknown weather variable {variable} (available: {listed})")
}

/// Buffered writer over `path`, or stdout when no path is given.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(stdout()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concession_core::Tables;

    fn base_args() -> Args {
        Args {
            data_dir: PathBuf::from("data"),
            config: None,
            block: Some("Chifunda".to_string()),
            list_blocks: false,
            vegetation_index: IndexArg::Evi,
            window: None,
            weather_variable: Some("temperature".to_string()),
            weather_window: None,
            report: ReportFormat::Json,
            output: None,
            verbose: false,
        }
    }

    fn context() -> ReportContext {
        let tables = Tables::from_json(
            r#"{ "concessions": [
                { "name": "Chifunda", "area_km2": 10.0, "total_fees": 100.0, "outfitter": "-" }
            ], "weather": [
                { "block": "Chifunda", "date": "2019-01-01", "variable": "temperature", "value": 30.0 },
                { "block": "Chifunda", "date": "2019-01-01", "variable": "humidity", "value": 45.0 }
            ] }"#,
        )
        .unwrap();
        ReportContext::new(tables, ReportConfig::default()).unwrap()
    }

    #[test]
    fn selection_takes_cli_choices() {
        let ctx = context();
        let mut args = base_args();
        args.window = Some(120);
        let selection = build_selection(&args, &ctx).unwrap();
        assert_eq!(selection.concession, "Chifunda");
        assert_eq!(selection.vegetation_index, VegetationIndex::Evi);
        assert_eq!(selection.evapotranspiration_window, 120);
        assert_eq!(selection.weather_variable.as_deref(), Some("temperature"));
        assert_eq!(selection.weather_window, 50);
    }

    #[test]
    fn selection_defaults_window_from_config() {
        let ctx = context();
        let selection = build_selection(&base_args(), &ctx).unwrap();
        assert_eq!(selection.evapotranspiration_window, 50);
        assert_eq!(selection.weather_window, 50);
    }

    #[test]
    fn weather_window_is_separate_from_evapotranspiration_window() {
        let ctx = context();
        let mut args = base_args();
        args.weather_window = Some(12);
        let selection = build_selection(&args, &ctx).unwrap();
        assert_eq!(selection.weather_window, 12);
        assert_eq!(selection.evapotranspiration_window, 50);
    }

    #[test]
    fn unknown_weather_variable_lists_alternatives() {
        let ctx = context();
        let mut selection = build_selection(&base_args(), &ctx).unwrap();
        assert!(check_weather_variable(&ctx, &selection).is_ok());

        selection.weather_variable = Some("wind".to_string());
        let message = check_weather_variable(&ctx, &selection)
            .unwrap_err()
            .to_string();
        assert!(message.contains("wind"));
        assert!(message.contains("available: humidity, temperature"));

        selection.weather_variable = None;
        assert!(check_weather_variable(&ctx, &selection).is_ok());
    }

    #[test]
    fn selection_requires_block() {
        let ctx = context();
        let mut args = base_args();
        args.block = None;
        assert!(build_selection(&args, &ctx).is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let missing = PathBuf::from("/nonexistent/concession-config.json");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("concession-config.json"));
        assert_eq!(load_config(None).unwrap(), ReportConfig::default());
    }

    #[test]
    fn output_goes_to_file_when_path_given() {
        let path = std::env::temp_dir().join(format!(
            "concession-output-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut out = open_output(Some(&path)).unwrap();
        writeln!(out, "hello").unwrap();
        out.flush().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }
}
