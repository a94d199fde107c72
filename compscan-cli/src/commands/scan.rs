//! `compscan scan` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use compscan_core::config::CompscanConfig;
use compscan_core::error::{CompscanError, InventoryError};
use compscan_core::types::{ArtifactKind, ScannedFile};
use compscan_core::{Artifact, ScanContext};
use compscan_pattern_engine::matching::coverage::{ATTR_COMPONENT_TYPE, ATTR_PROVENANCE};
use compscan_pattern_engine::{
    ComponentPatternEngineBuilder, PatternEngineConfig, PatternStore, RuleLoader, RunSummary,
};

use crate::cli::ScanArgs;
use crate::commands::load_effective_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_effective_config(config_path).await?;
    let report = run(&args, &config).await?;
    writer.render(&report)?;
    Ok(())
}

/// Load the inventory and rules, run the engine and build the report.
///
/// # Errors
///
/// - `CliError::Io` if the inventory cannot be read
/// - `CliError::Core` (inventory) if it is not a JSON array of scanned files or exceeds
///   `max_scanned_files`
/// - `CliError::Rule` if the rule directory cannot be read
/// - `CliError::Descriptor` if a matching pass aborts on a misconfigured descriptor
pub async fn run(args: &ScanArgs, config: &CompscanConfig) -> Result<ScanReport, CliError> {
    let files = read_inventory(&args.inventory, config.matcher.max_scanned_files).await?;

    let rules_dir = args
        .rules
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.matcher.rules_dir));
    let rules = RuleLoader::load_directory(&rules_dir).await?;

    let mut engine_config = PatternEngineConfig::from_core(&config.matcher);
    if args.no_deferred {
        engine_config.run_deferred_pass = false;
    }
    let mut engine = ComponentPatternEngineBuilder::new()
        .config(engine_config)
        .rules(rules)
        .build()?;

    let scan_root = args
        .inventory
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let mut context = ScanContext::from_scanned_files(scan_root, &files)
        .with_asset_id_chain(args.asset_ids.clone());
    let mut store = PatternStore::new();

    let scan_id = uuid::Uuid::new_v4().to_string();
    info!(
        scan_id = %scan_id,
        inventory = %args.inventory.display(),
        files = files.len(),
        rules_dir = %rules_dir.display(),
        "starting component scan"
    );

    let summary = engine.run_all(&mut context, &mut store)?;

    Ok(ScanReport::from_context(
        scan_id,
        args.inventory.display().to_string(),
        files.len(),
        store.len(),
        summary,
        &context,
    ))
}

/// Read a JSON array of scanned files.
pub async fn read_inventory(path: &Path, max_files: usize) -> Result<Vec<ScannedFile>, CliError> {
    let content = tokio::fs::read_to_string(path).await?;

    let files: Vec<ScannedFile> = serde_json::from_str(&content).map_err(|e| {
        CompscanError::from(InventoryError::Failed {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })
    })?;

    if files.len() > max_files {
        return Err(CompscanError::from(InventoryError::TooLarge {
            size: files.len(),
            max: max_files,
        })
        .into());
    }

    Ok(files)
}

/// Result of one `scan` run.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub inventory: String,
    pub files_scanned: usize,
    pub descriptors: usize,
    pub components: Vec<ComponentEntry>,
    /// Artifacts added by expansion inventories
    pub expanded: Vec<String>,
    /// File artifacts no component absorbed
    pub loose_files: Vec<String>,
    pub summary: RunSummary,
}

#[derive(Debug, Serialize)]
pub struct ComponentEntry {
    pub name: String,
    pub version: String,
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    pub provenance: String,
}

impl ComponentEntry {
    fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            name: artifact
                .component
                .clone()
                .unwrap_or_else(|| artifact.id.clone()),
            version: artifact.version.clone().unwrap_or_default(),
            asset_id: artifact.asset_id.clone().unwrap_or_default(),
            anchor: artifact.path_in_asset.clone(),
            component_type: artifact.attributes.get(ATTR_COMPONENT_TYPE).cloned(),
            provenance: artifact
                .attributes
                .get(ATTR_PROVENANCE)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

impl ScanReport {
    /// Collect components, expansion artifacts and loose files from the context.
    pub fn from_context(
        scan_id: String,
        inventory: String,
        files_scanned: usize,
        descriptors: usize,
        summary: RunSummary,
        context: &ScanContext,
    ) -> Self {
        let mut components = Vec::new();
        let mut expanded = Vec::new();
        let mut loose_files = Vec::new();

        for artifact in context.artifacts() {
            match artifact.kind {
                ArtifactKind::Component => components.push(ComponentEntry::from_artifact(artifact)),
                ArtifactKind::Expanded => expanded.push(artifact.id.clone()),
                ArtifactKind::File if !artifact.is_absorbed() => loose_files.push(
                    artifact
                        .path_in_asset
                        .clone()
                        .unwrap_or_else(|| artifact.id.clone()),
                ),
                ArtifactKind::File => {}
            }
        }

        Self {
            scan_id,
            inventory,
            files_scanned,
            descriptors,
            components,
            expanded,
            loose_files,
            summary,
        }
    }
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let total = self.summary.total();

        writeln!(w, "Component Scan: {}", self.inventory.bold())?;
        writeln!(w, "  Scan ID: {}", self.scan_id)?;
        writeln!(
            w,
            "  Files: {} scanned, {} absorbed, {} loose",
            self.files_scanned,
            total.artifacts_absorbed,
            self.loose_files.len()
        )?;
        writeln!(
            w,
            "  Descriptors: {} ({} unspecific skipped)",
            self.descriptors, self.summary.extraction.descriptors_unspecific
        )?;
        if self.summary.deferred.is_none() {
            writeln!(w, "  Deferred pass: {}", "skipped".yellow())?;
        }
        writeln!(w)?;

        writeln!(w, "Components ({})", self.components.len().to_string().bold())?;
        if !self.components.is_empty() {
            writeln!(
                w,
                "{:<30} {:<15} {:<40} Anchor",
                "Name", "Version", "Asset ID"
            )?;
            writeln!(w, "{}", "-".repeat(100))?;
            for c in &self.components {
                writeln!(
                    w,
                    "{:<30} {:<15} {:<40} {}",
                    c.name.green(),
                    c.version,
                    c.asset_id,
                    c.anchor.as_deref().unwrap_or("(root)")
                )?;
            }
        }

        if !self.expanded.is_empty() {
            writeln!(w)?;
            writeln!(w, "Expanded ({})", self.expanded.len())?;
            for id in &self.expanded {
                writeln!(w, "  {}", id)?;
            }
        }

        writeln!(w)?;
        writeln!(w, "Loose files ({})", self.loose_files.len())?;
        for path in &self.loose_files {
            writeln!(w, "  {}", path.dimmed())?;
        }

        Ok(())
    }
}
