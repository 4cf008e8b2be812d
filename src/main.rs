//! Nanopore run preparation main executable

pub mod common;
pub mod err;
pub mod refs;
pub mod sheet;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Nanopore sequencing run preparation",
    long_about = "This tool normalizes the reference files of a run to FASTA and expands the \
                  run worksheet into the sample sheets of the pipeline"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Reference file related commands.
    Refs(Refs),
    /// Run worksheet related commands.
    Sheet(Sheet),
}

/// Parsing of "refs *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Refs {
    /// The sub command to run
    #[command(subcommand)]
    command: RefsCommands,
}

/// Enum supporting the parsing of "refs *" sub commands.
#[derive(Debug, Subcommand)]
enum RefsCommands {
    Normalize(refs::normalize::Args),
}

/// Parsing of "sheet *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Sheet {
    /// The sub command to run
    #[command(subcommand)]
    command: SheetCommands,
}

/// Enum supporting the parsing of "sheet *" sub commands.
#[derive(Debug, Subcommand)]
enum SheetCommands {
    Expand(sheet::expand::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Refs(refs) => match &refs.command {
                RefsCommands::Normalize(args) => refs::normalize::run(&cli.common, args)?,
            },
            Commands::Sheet(sheet) => match &sheet.command {
                SheetCommands::Expand(args) => sheet::expand::run(&cli.common, args)?,
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sheet_expand() -> Result<(), anyhow::Error> {
        let cli = Cli::try_parse_from([
            "nanopore-run-prep",
            "sheet",
            "expand",
            "--col-barcode",
            "header:Barcode",
            "20250228",
        ])?;

        match cli.command {
            Commands::Sheet(Sheet {
                command: SheetCommands::Expand(args),
            }) => {
                assert_eq!(args.run_id, "20250228");
                assert_eq!(args.default_size, 7000);
                assert_eq!(
                    args.col_barcode,
                    sheet::expand::columns::ColumnRef::Header(String::from("Barcode"))
                );
                assert_eq!(
                    args.col_size,
                    sheet::expand::columns::ColumnRef::Letter(6)
                );
            }
            _ => panic!("unexpected command"),
        }

        Ok(())
    }

    #[test]
    fn parse_rejects_empty_run_id() {
        assert!(Cli::try_parse_from(["nanopore-run-prep", "refs", "normalize", ""]).is_err());
    }

    #[test]
    fn parse_rejects_run_id_with_whitespace() {
        assert!(Cli::try_parse_from(["nanopore-run-prep", "sheet", "expand", "2025 NB"]).is_err());
        assert!(Cli::try_parse_from(["nanopore-run-prep", "refs", "normalize", "2025 NB"]).is_err());
    }

    #[test]
    fn parse_rejects_invalid_column() {
        assert!(Cli::try_parse_from([
            "nanopore-run-prep",
            "sheet",
            "expand",
            "--col-size",
            "G7",
            "20250228",
        ])
        .is_err());
    }
}
