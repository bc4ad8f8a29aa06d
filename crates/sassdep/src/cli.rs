use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sassdep")]
#[command(about = "Find Sass stylesheets that need recompiling")]
pub struct Cli {
    /// Path to config file (sassdep.json or sassdep.jsonc)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stylesheet glob patterns [default: **/*.{scss,sass}]
    #[arg(short, long)]
    pub source: Vec<String>,

    /// Include paths for resolving imports, searched in order [default: .]
    #[arg(short = 'I', long)]
    pub include_path: Vec<PathBuf>,

    /// Files changed since the last build
    #[arg(short, long)]
    pub changed: Vec<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, default_value = ".")]
    pub cwd: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print the imports of every stylesheet
    #[arg(long, default_value = "false")]
    pub deps: bool,

    /// Verbose diagnostics
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Suppress non-debug diagnostics
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
