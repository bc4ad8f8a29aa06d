use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sassdep::cli::{Cli, OutputFormat};
use sassdep::reporter::{report_json, report_text};
use sassdep::{
    AnalysisConfig, DEFAULT_SOURCE_GLOB, FileConfig, TrackerConfig, TrackerError,
    find_affected_files,
};

/// Find default config file in directory
fn find_default_config(dir: &Path) -> Option<PathBuf> {
    let json_path = dir.join("sassdep.json");
    if json_path.exists() {
        return Some(json_path);
    }

    let jsonc_path = dir.join("sassdep.jsonc");
    if jsonc_path.exists() {
        return Some(jsonc_path);
    }

    None
}

/// Load config from file path, supporting .json and .jsonc
fn load_config_file(path: &Path) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let mut content = fs::read_to_string(path)?;
    json_strip_comments::strip(&mut content)?;
    let config: FileConfig = serde_json::from_str(&content)?;
    Ok(config)
}

fn init_logging(debug: bool) {
    let default = if debug { "sassdep=debug" } else { "sassdep=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    // Load config file
    let file_config = if let Some(config_path) = &cli.config {
        // Use specified config file (error if not found)
        if !config_path.exists() {
            eprintln!("Error: Config file not found: {}", config_path.display());
            std::process::exit(1);
        }
        Some(load_config_file(config_path)?)
    } else {
        // Look for default config file in cwd
        match find_default_config(&cli.cwd) {
            Some(path) => match load_config_file(&path) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!("failed to parse config file '{}': {}", path.display(), e);
                    None
                }
            },
            None => None,
        }
    };

    // Merge config: CLI args override file config
    let sources = if !cli.source.is_empty() {
        cli.source
    } else if let Some(cfg) = file_config.as_ref().filter(|cfg| !cfg.sources.is_empty()) {
        cfg.sources.clone()
    } else {
        vec![DEFAULT_SOURCE_GLOB.to_string()]
    };

    let include_paths = if !cli.include_path.is_empty() {
        cli.include_path
    } else if let Some(ref cfg) = file_config {
        cfg.include_paths.clone()
    } else {
        Vec::new()
    };

    let ignore = if !cli.ignore.is_empty() {
        cli.ignore
    } else if let Some(ref cfg) = file_config {
        cfg.ignore.clone()
    } else {
        Vec::new()
    };

    let config = AnalysisConfig {
        sources,
        include_paths,
        changed: cli.changed,
        cwd: cli.cwd.clone(),
        ignore,
        tracker: TrackerConfig {
            debug: cli.debug,
            suppress_output: cli.quiet,
            ..Default::default()
        },
    };

    let cwd = config.cwd.canonicalize()?;

    match find_affected_files(config) {
        Ok(report) => match cli.format {
            OutputFormat::Text => report_text(&report, &cwd, cli.deps),
            OutputFormat::Json => report_json(&report)?,
        },
        Err(TrackerError::NoSourceFiles(patterns)) => {
            eprintln!("Error: No stylesheets found matching patterns: {patterns:?}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
