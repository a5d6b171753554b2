mod commands;
mod fetch;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tabscrape",
    version,
    about = "Extract tables from web pages and PDFs and export them to Excel"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file (detection, preview and fetch settings)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a web page and extract its HTML tables
    Scrape {
        /// Page URL (https:// is assumed when no scheme is given)
        url: String,

        #[command(flatten)]
        opts: ExtractArgs,
    },
    /// Extract tables from a local HTML file
    Html {
        input_file: PathBuf,

        #[command(flatten)]
        opts: ExtractArgs,
    },
    /// Extract tables from a PDF (requires pdftotext)
    Pdf {
        input_file: PathBuf,

        #[command(flatten)]
        opts: ExtractArgs,
    },
    /// Extract tables from text already extracted from a PDF
    Text {
        input_file: PathBuf,

        #[command(flatten)]
        opts: ExtractArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Output format: table (default) or json
    #[arg(short, long, default_value = "table")]
    pub output: String,

    /// Table id to export (repeatable)
    #[arg(short, long = "select", value_name = "ID")]
    pub select: Vec<usize>,

    /// Export every table found
    #[arg(long)]
    pub all: bool,

    /// Export the selected tables to NAME.xlsx
    #[arg(short, long = "export", value_name = "NAME")]
    pub export: Option<String>,

    /// Directory the workbook is written to
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Scrape { url, opts } => commands::extract::scrape(&url, &opts, &config),
            Commands::Html { input_file, opts } => {
                commands::extract::html_file(&input_file, &opts, &config)
            }
            Commands::Pdf { input_file, opts } => {
                commands::extract::pdf_file(&input_file, &opts, &config)
            }
            Commands::Text { input_file, opts } => {
                commands::extract::text_file(&input_file, &opts, &config)
            }
        }
    });

    if let Err(e) = result {
        eprintln!("Error ({}): {e}", e.kind());
        std::process::exit(1);
    }
}
