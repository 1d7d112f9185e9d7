mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use synctex_locate::{Error, diagnostics};

#[derive(Parser)]
#[command(name = "synctex-locate", about = "Map between TeX source lines and PDF page positions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log lookup details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the source line behind a point on a page
    Backward {
        /// Emit JSON
        #[arg(long)]
        json: bool,
        /// One-based page number
        #[arg(long)]
        page: u32,
        /// Rendered PDF; its synctex file is looked up next to it
        #[arg(long)]
        pdf: PathBuf,
        /// Horizontal position in big points
        #[arg(short, allow_negative_numbers = true)]
        x: f64,
        /// Vertical position in big points, downward from the top
        #[arg(short, allow_negative_numbers = true)]
        y: f64,
    },
    /// Find where a source line was typeset
    Forward {
        /// Source file
        #[arg(long)]
        file: PathBuf,
        /// Emit JSON
        #[arg(long)]
        json: bool,
        /// One-based source line
        #[arg(long)]
        line: u32,
        /// Rendered PDF; its synctex file is looked up next to it
        #[arg(long)]
        pdf: PathBuf,
    },
    /// Summarize the synctex data of a PDF
    Inspect {
        /// Emit JSON
        #[arg(long)]
        json: bool,
        /// Rendered PDF; its synctex file is looked up next to it
        #[arg(long)]
        pdf: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Backward { json, page, pdf, x, y } => commands::backward(&pdf, page, x, y, json),
        Commands::Forward { file, json, line, pdf } => commands::forward(&pdf, &file, line, json),
        Commands::Inspect { json, pdf } => commands::inspect(&pdf, json),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => exit_code_for(&e),
    };
}

/// Install a stderr fmt subscriber; DEBUG with `--verbose`, INFO otherwise.
fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Print the diagnostic and pick an exit code.
/// Lookups that ran but found nothing exit 1; load and parse failures exit 2.
fn exit_code_for(e: &Error) -> ExitCode {
    diagnostics::print_error(e);
    if e.is_no_location() {
        return ExitCode::from(1);
    }
    return ExitCode::from(2);
}
