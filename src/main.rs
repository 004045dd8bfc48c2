//! partbind - merge annotated chapter files

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use partbind::{AssembleOptions, OffsetMode, assemble_dir, default_output_path};

#[derive(Parser)]
#[command(name = "partbind")]
#[command(version, about = "Assembles annotated chapter files into one document", long_about = None)]
#[command(after_help = "EXAMPLES:
    partbind emma                 Merge emma/*.xml into emma.xml
    partbind emma -p              Wrap each chapter in <chapter> tags
    partbind emma out/emma.xml    Write to a chosen file")]
struct Cli {
    /// Directory of annotated chapter files
    #[arg(value_name = "INPUT_DIR")]
    input: PathBuf,

    /// Output file (defaults to INPUT_DIR.xml)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Wrap each chapter's content in a <chapter> element
    #[arg(short = 'p', long = "sections")]
    sections: bool,

    /// How span id offsets advance between files
    #[arg(long, value_enum, default_value_t = OffsetMode::Legacy)]
    offset_mode: OffsetMode,

    /// Print a JSON summary of the merge to stdout
    #[arg(long)]
    summary: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = AssembleOptions::new()
        .with_section_tags(cli.sections)
        .with_offset_mode(cli.offset_mode);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let assembly = assemble_dir(&cli.input, options).map_err(|e| e.to_string())?;
    assembly.write_to(&output).map_err(|e| e.to_string())?;
    tracing::info!(output = %output.display(), "wrote merged document");

    if cli.summary {
        let json = serde_json::to_string_pretty(&assembly.summary).map_err(|e| e.to_string())?;
        println!("{json}");
    }

    Ok(())
}
