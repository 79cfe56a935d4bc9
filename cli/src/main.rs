// Copyright 2024 Numunit Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

/// This is the main entry point for the Numunit CLI application.
///
/// The application rewrites quantities written in traditional Chinese units and parses
/// traditional numerals using the Numunit library.
/// It uses the `clap` crate for command-line argument parsing and `stderrlog` for logging.
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_stdin::MaybeStdin;
use serde::Serialize;
use stderrlog::Timestamp;

use numunit::{parse_ordinal, Config, Replacement, Rewriter, UnitRegistry};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON unit table replacing the built-in units.
    #[arg(long, env = "NUMUNIT_UNITS", global = true)]
    units: Option<String>,

    /// Merge the unit table into the built-in units instead of replacing them.
    #[arg(long, requires = "units", global = true)]
    extend_units: bool,

    /// Characters accepted between the two quantities of a range.
    #[arg(long, env = "NUMUNIT_RANGE_SELECTORS", global = true)]
    range_selectors: Option<String>,

    /// Increase log verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every quantity of a text into metric units.
    Rewrite(RewriteArgs),
    /// Print the value of a traditional numeral.
    Parse(ParseArgs),
}

#[derive(Args)]
struct RewriteArgs {
    /// Text to rewrite, `-` reads it from stdin.
    #[arg(conflicts_with = "file")]
    text: Option<MaybeStdin<String>>,
    #[arg(short, long)]
    file: Option<String>,
    /// Character offset where scanning starts.
    #[arg(long, default_value_t = 0)]
    offset: usize,
    #[arg(short, long)]
    output: Option<String>,
    /// Print one JSON line per quantity instead of the rewritten text.
    #[arg(long)]
    report: bool,
}

#[derive(Args)]
struct ParseArgs {
    numeral: String,
}

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("Missing input: pass a text, `-` for stdin, or --file")]
    MissingInput,
}

#[derive(Serialize)]
struct ReportLine<'a> {
    start: usize,
    end: usize,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a Replacement<'a>> for ReportLine<'a> {
    fn from(r: &'a Replacement<'a>) -> Self {
        let (replacement, error) = match &r.outcome {
            Ok(converted) => (Some(converted.as_str()), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            start: r.span.start,
            end: r.span.end,
            source: r.source,
            replacement,
            error,
        }
    }
}

impl Cli {
    async fn get_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::default();
        if let Some(path) = &self.units {
            let table = UnitRegistry::from_json(&tokio::fs::read_to_string(path).await?)?;
            if self.extend_units {
                config.units.extend(table);
            } else {
                config.units = table;
            }
        }
        if let Some(selectors) = &self.range_selectors {
            config = config.with_range_selectors(selectors.chars());
        }
        log::debug!(
            "units: {:?}, range selectors: {:?}",
            config.units,
            config.range_selectors
        );
        Ok(config)
    }
}

async fn read_input(args: &RewriteArgs) -> anyhow::Result<String> {
    match (&args.text, &args.file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => Ok(tokio::fs::read_to_string(path).await?),
        (None, None) => Err(ConfigError::MissingInput.into()),
    }
}

fn report(rewriter: &Rewriter, text: &str, offset: usize) -> anyhow::Result<String> {
    let mut out = String::new();
    for replacement in rewriter.replacements(text, offset) {
        out.push_str(&serde_json::to_string(&ReportLine::from(&replacement))?);
        out.push('\n');
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // the binary and the library share the `numunit` module path
    stderrlog::new()
        .module(module_path!())
        .verbosity(1 + cli.verbose as usize)
        .timestamp(Timestamp::Millisecond)
        .init()?;

    match &cli.command {
        Commands::Rewrite(args) => {
            let rewriter = Rewriter::new(cli.get_config().await?)?;
            let text = read_input(args).await?;
            let result = if args.report {
                report(&rewriter, &text, args.offset)?
            } else {
                rewriter.rewrite_from(&text, args.offset)
            };
            match &args.output {
                Some(path) => tokio::fs::write(path, result).await?,
                None => print!("{}", result),
            }
        }
        Commands::Parse(args) => {
            println!("{}", parse_ordinal(&args.numeral)?);
        }
    }

    Ok(())
}
