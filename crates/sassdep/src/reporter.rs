use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
pub struct Report {
    /// Stylesheets that need compiling
    pub files: Vec<PathBuf>,
    /// Direct imports of every collected stylesheet
    pub dependencies: BTreeMap<PathBuf, Vec<PathBuf>>,
    pub total_files: usize,
    pub affected_count: usize,
}

impl Report {
    pub fn new(
        files: Vec<PathBuf>,
        dependencies: BTreeMap<PathBuf, Vec<PathBuf>>,
        total_files: usize,
    ) -> Self {
        let affected_count = files.len();
        Self { files, dependencies, total_files, affected_count }
    }
}

fn relative<'a>(path: &'a Path, cwd: &Path) -> std::path::Display<'a> {
    path.strip_prefix(cwd).unwrap_or(path).display()
}

pub fn report_text(report: &Report, cwd: &Path, show_dependencies: bool) {
    if show_dependencies {
        println!("Dependencies:");
        for (file, imports) in &report.dependencies {
            println!("  {}", relative(file, cwd));
            for import in imports {
                println!("    -> {}", relative(import, cwd));
            }
        }
        println!();
    }

    if report.files.is_empty() {
        println!("All stylesheets are up to date.");
        return;
    }

    println!("Stylesheets to compile ({}):", report.affected_count);
    for file in &report.files {
        println!("  {}", relative(file, cwd));
    }
    println!("\n{}/{} files need compiling", report.affected_count, report.total_files);
}

pub fn report_json(report: &Report) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
