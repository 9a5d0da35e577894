//! Classilist CLI - export classification results as delimited text

mod input;
mod logging;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use classilist_core::{CancellationToken, LoggingMonitor, RowSource};
use classilist_csv::{
    derive_roles, unescape_string, DestinationSettings, FormatSettings, LineEnding,
    OverwritePolicy, QuoteMode,
};

use crate::input::CsvRowSource;

#[derive(Parser)]
#[command(name = "classilist")]
#[command(
    author,
    version,
    about = "Export probabilistic classification results as delimited text"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a classification result table to a file
    Export(ExportArgs),

    /// Show the role derived for every column of a table
    Roles {
        /// Input CSV file with a header row
        input: PathBuf,
    },

    /// Print the default format settings as JSON
    Settings {
        /// Save them to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Input CSV file with a header row
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// JSON settings file; flags given here override it
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Data separator; escapes like \t are understood
    #[arg(long)]
    separator: Option<String>,

    /// Quote mode: ALWAYS, IF_NEEDED, REPLACE or STRINGS
    #[arg(long)]
    quote_mode: Option<String>,

    /// Pattern written for missing values
    #[arg(long)]
    missing: Option<String>,

    /// Decimal separator for numeric columns
    #[arg(long)]
    decimal_separator: Option<char>,

    /// Line ending: SYST, LF, CRLF or CR
    #[arg(long)]
    line_ending: Option<String>,

    /// Write the row keys as first column
    #[arg(long)]
    row_id: bool,

    /// What to do if the output file exists
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Output character encoding label (e.g. latin1, windows-1252)
    #[arg(long)]
    encoding: Option<String>,

    /// Columns to treat as numeric regardless of their content
    #[arg(long, value_delimiter = ',')]
    numeric: Vec<String>,

    /// Cancel the export after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Abort,
    Overwrite,
    Append,
}

impl From<Policy> for OverwritePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Abort => OverwritePolicy::Abort,
            Policy::Overwrite => OverwritePolicy::Overwrite,
            Policy::Append => OverwritePolicy::Append,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Export(args) => export(args),
        Commands::Roles { input } => show_roles(&input),
        Commands::Settings { output } => print_settings(output.as_deref()),
    }
}

fn export(args: ExportArgs) -> Result<()> {
    let format = format_settings(&args)?;
    let mut destination = DestinationSettings::new(&args.output).with_format(format);
    if let Some(policy) = args.policy {
        destination = destination.with_policy(policy.into());
    }

    destination.validate()?;
    if let Some(warning) = destination.check_destination()? {
        eprintln!("Warning: {warning}");
    }

    let source = open_input(&args.input, &args.numeric)?;
    for warning in destination.configure_warnings(source.spec()) {
        eprintln!("Warning: {warning}");
    }

    let token = CancellationToken::new();
    if let Some(secs) = args.timeout {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            tracing::info!(secs, "timeout reached, cancelling export");
            token.cancel();
        });
    }

    let outcome = match destination.write_table(source, LoggingMonitor::new(token)) {
        Ok(outcome) => outcome,
        Err(err) if err.is_cancelled() => bail!("Export cancelled, output discarded"),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to write '{}'", args.output.display()))
        }
    };

    if let Some(warning) = outcome.warning {
        eprintln!("Warning: {warning}");
    }
    eprintln!(
        "Wrote {} rows to '{}'",
        outcome.rows_written,
        args.output.display()
    );
    Ok(())
}

fn format_settings(args: &ExportArgs) -> Result<FormatSettings> {
    let mut settings = match &args.settings {
        Some(path) => FormatSettings::load(path)
            .with_context(|| format!("Failed to load settings '{}'", path.display()))?,
        None => FormatSettings::default(),
    };

    if let Some(separator) = &args.separator {
        settings.separator = Some(unescape_string(separator));
    }
    if let Some(mode) = &args.quote_mode {
        settings.quote_mode = QuoteMode::from_name(&mode.to_uppercase())?;
    }
    if let Some(missing) = &args.missing {
        settings.missing_pattern = Some(unescape_string(missing));
    }
    if let Some(decimal_separator) = args.decimal_separator {
        settings.decimal_separator = decimal_separator;
    }
    if let Some(line_ending) = &args.line_ending {
        settings.line_ending = LineEnding::from_name(&line_ending.to_uppercase())?;
    }
    if args.row_id {
        settings.write_row_id = true;
    }
    if let Some(encoding) = &args.encoding {
        settings.encoding = Some(encoding.clone());
    }
    Ok(settings)
}

fn open_input(input: &Path, numeric: &[String]) -> Result<CsvRowSource<std::fs::File>> {
    CsvRowSource::open(input, numeric)
        .with_context(|| format!("Failed to read '{}'", input.display()))
}

fn show_roles(input: &Path) -> Result<()> {
    let source = open_input(input, &[])?;
    let spec = source.spec();
    let layout = derive_roles(spec)?;

    println!("Class column: {}", layout.class_column());
    for ((column, role), header) in spec
        .columns()
        .iter()
        .zip(layout.roles())
        .zip(layout.header_names(spec))
    {
        println!(
            "  {:<30} {:<8} {:<24} -> {}",
            column.name,
            column.column_type.to_string(),
            role.to_string(),
            header
        );
    }
    Ok(())
}

fn print_settings(output: Option<&Path>) -> Result<()> {
    let settings = FormatSettings::default();
    match output {
        Some(path) => {
            settings
                .save(path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote default settings to '{}'", path.display());
        }
        None => println!("{}", settings.to_json_string()?),
    }
    Ok(())
}
