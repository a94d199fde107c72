//! `compscan rules` command handler

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use compscan_pattern_engine::RuleLoader;

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(args: RulesArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        RulesAction::Validate { path } => {
            let report = validate(&path).await?;
            writer.render(&report)?;
            if report.invalid > 0 {
                return Err(CliError::Rule(format!(
                    "{} invalid rule files",
                    report.invalid
                )));
            }
            Ok(())
        }
    }
}

/// Parse every `*.toml` file in `dir` and report per-file results.
///
/// Unlike [`RuleLoader::load_directory`], a bad file is reported instead of
/// skipped, and duplicate contributor ids across files are listed.
///
/// # Errors
///
/// `CliError::Io` if the directory itself cannot be read.
pub async fn validate(dir: &Path) -> Result<RuleValidationReport, CliError> {
    info!(path = %dir.display(), "validating contributor rules");

    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut report = RuleValidationReport {
        path: dir.display().to_string(),
        total_files: paths.len(),
        ..RuleValidationReport::default()
    };
    let mut seen_ids = HashSet::new();

    for path in paths {
        match RuleLoader::load_file(&path).await {
            Ok(rules) => {
                report.valid += 1;
                for rule in rules {
                    if seen_ids.insert(rule.id.clone()) {
                        report.contributors.push(rule.id);
                    } else {
                        report.duplicates.push(rule.id);
                    }
                }
            }
            Err(e) => {
                report.invalid += 1;
                report.errors.push(RuleError {
                    file: path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

#[derive(Debug, Default, Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub total_files: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Contributor ids in load order (first occurrence wins)
    pub contributors: Vec<String>,
    /// Ids that a later file redefines; those rules are skipped at load time
    pub duplicates: Vec<String>,
    pub errors: Vec<RuleError>,
}

#[derive(Debug, Serialize)]
pub struct RuleError {
    pub file: String,
    pub error: String,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.path.bold())?;
        writeln!(
            w,
            "  Files: {} total, {} valid, {} invalid",
            self.total_files,
            self.valid.to_string().green(),
            self.invalid.to_string().red()
        )?;
        writeln!(w, "  Contributors: {}", self.contributors.len())?;
        for id in &self.contributors {
            writeln!(w, "    - {}", id)?;
        }
        for id in &self.duplicates {
            writeln!(w, "  {} duplicate id '{}' skipped", "Warning:".yellow(), id)?;
        }
        for err in &self.errors {
            writeln!(w, "  {} {}: {}", "Error:".red().bold(), err.file, err.error)?;
        }

        Ok(())
    }
}
