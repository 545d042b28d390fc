use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use enclosure_calc::{ColumnLabels, Error as CalcError, RuleList, Worksheet};
use thiserror::Error;
use tracing::info;

use crate::telemetry::{self, TelemetryError};

#[derive(Parser, Debug)]
#[command(
    name = "enclosure-calc",
    about = "Compute material quantities for rectangular enclosures from formula rules",
    version
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate items and write the material table as CSV
    Evaluate(EvaluateArgs),
    /// Inspect or export rule lists
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Write a rule list as pretty JSON
    Export(ExportArgs),
    /// Report syntax errors and unresolved references in a rule file
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// JSON rule file (built-in template when omitted)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Item as "label,length,width,enclosed"; repeatable
    #[arg(long = "item", value_parser = parse_item_spec)]
    items: Vec<ItemSpec>,
    /// Write the CSV here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Use English column names
    #[arg(long)]
    english: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// JSON rule file (built-in template when omitted)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Write the JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// JSON rule file to check
    #[arg(long)]
    rules: PathBuf,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq)]
struct ItemSpec {
    label: String,
    length: f64,
    width: f64,
    is_enclosed: bool,
}

/// Parse `label,length,width,enclosed`. The label may itself contain commas.
fn parse_item_spec(text: &str) -> Result<ItemSpec, String> {
    let mut fields = text.rsplitn(4, ',');
    let (Some(enclosed), Some(width), Some(length), Some(label)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(format!("expected 'label,length,width,enclosed', got '{text}'"));
    };

    let number = |name: &str, raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| format!("{name} '{}' is not a number", raw.trim()))
    };
    let is_enclosed = match enclosed.trim().to_ascii_lowercase().as_str() {
        "1" | "y" | "yes" | "true" => true,
        "0" | "n" | "no" | "false" => false,
        other => return Err(format!("enclosed '{other}' is not yes/no")),
    };

    Ok(ItemSpec {
        label: label.trim().to_owned(),
        length: number("length", length)?,
        width: number("width", width)?,
        is_enclosed,
    })
}

pub fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Evaluate(args) => evaluate(args),
        Command::Rules {
            command: RulesCommand::Export(args),
        } => export(args),
        Command::Rules {
            command: RulesCommand::Check(args),
        } => check(&args.rules),
    }
}

fn load_rules(path: Option<&Path>) -> Result<RuleList, CalcError> {
    match path {
        Some(path) => {
            let rules = RuleList::from_file(path)?;
            info!(path = %path.display(), rules = rules.len(), "rules loaded");
            Ok(rules)
        }
        None => Ok(RuleList::defaults()),
    }
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn evaluate(args: EvaluateArgs) -> Result<ExitCode, CliError> {
    let mut sheet = Worksheet::new(load_rules(args.rules.as_deref())?);
    for item in args.items {
        if sheet
            .add_item(&item.label, item.length, item.width, item.is_enclosed)
            .is_none()
        {
            eprintln!("skipping '{}': length and width are both 0", item.label);
        }
    }
    for item in sheet.items() {
        for warning in item.warnings() {
            eprintln!("warning: {} {}: {warning}", item.id(), item.label());
        }
    }

    let labels = if args.english {
        ColumnLabels::english()
    } else {
        ColumnLabels::default()
    };
    let mut out = open_output(args.output.as_deref())?;
    sheet.write_csv(&mut out, &labels)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn export(args: ExportArgs) -> Result<ExitCode, CliError> {
    let rules = load_rules(args.rules.as_deref())?;
    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "{}", rules.to_json()?)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn check(path: &Path) -> Result<ExitCode, CliError> {
    let compiled = load_rules(Some(path))?.compile();
    let errors = compiled.syntax_errors();
    for (id, err) in &errors {
        println!("{id}: {err}");
    }
    for finding in compiled.lint() {
        println!("{finding}");
    }
    println!("{compiled}");

    Ok(if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
