//! Export of the propagated graph to JSON datasets and text reports.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::context::Context;
use crate::error::AppError;
use crate::graph::PersonsView;
use crate::models::{FamilyUnit, Finding, FindingKind, TreeNode};
use crate::services::{Statistics, TreeService, ValidationReport, ValidationService};

pub const DATASET_FILE: &str = "family_data.json";
pub const DATASET_MIN_FILE: &str = "family_data.min.json";
pub const TREE_FILE: &str = "family_tree.json";
pub const ANOMALY_REPORT_FILE: &str = "anomaly_report.txt";
pub const MISSING_GENERATIONS_FILE: &str = "missing_generations.tsv";

/// Dataset header.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub family_name: String,
    pub founder_id: String,
    pub founder_name: Option<String>,
    pub total_members: usize,
    pub total_families: usize,
    /// Number of distinct generation values.
    pub total_generations: usize,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// Full dataset written to `family_data.json`.
#[derive(Serialize)]
pub struct Dataset<'a> {
    pub metadata: Metadata,
    pub statistics: Statistics,
    pub persons: PersonsView<'a>,
    pub families: &'a [FamilyUnit],
    pub anomalies: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,
}

/// Paths written by [`ExportService::write_all`].
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub report: ValidationReport,
}

/// Service serializing the context to the output directory.
#[derive(Clone)]
pub struct ExportService {
    ctx: Context,
}

impl From<&Context> for ExportService {
    fn from(ctx: &Context) -> Self {
        Self { ctx: ctx.clone() }
    }
}

impl ExportService {
    /// Assemble the dataset with a founder tree bounded at the configured depth.
    pub fn dataset(&self, report: &ValidationReport) -> Dataset<'_> {
        let store = &self.ctx.store;
        let statistics = Statistics::compute(store);
        let founder_id = self.ctx.founder_id();

        let metadata = Metadata {
            family_name: self.ctx.config.lineage.family_name.clone(),
            founder_id: founder_id.to_string(),
            founder_name: store.get(founder_id).map(|f| f.display_name()),
            total_members: statistics.total_members,
            total_families: statistics.total_families,
            total_generations: statistics.generation_count(),
            generated_at: chrono::Local::now().to_rfc3339(),
            source_file: self
                .ctx
                .source
                .as_ref()
                .map(|p| p.display().to_string()),
        };

        let tree = TreeService::from(&self.ctx)
            .build_tree(founder_id, Some(self.ctx.config.export.dataset_tree_depth));

        Dataset {
            metadata,
            statistics,
            persons: store.persons(),
            families: store.family_units(),
            anomalies: report.findings().cloned().collect(),
            tree,
        }
    }

    /// Run validation and write every output file into `out_dir`.
    pub fn write_all(&self, out_dir: &Path) -> Result<ExportSummary, AppError> {
        fs::create_dir_all(out_dir)?;
        let report = ValidationService::from(&self.ctx).validate();
        let mut files = Vec::new();

        let dataset = self.dataset(&report);
        let path = out_dir.join(DATASET_FILE);
        fs::write(&path, serde_json::to_string_pretty(&dataset)?)?;
        files.push(path);
        let path = out_dir.join(DATASET_MIN_FILE);
        fs::write(&path, serde_json::to_string(&dataset)?)?;
        files.push(path);

        let tree = TreeService::from(&self.ctx).build_tree(
            self.ctx.founder_id(),
            Some(self.ctx.config.export.tree_depth),
        );
        match tree {
            Some(tree) => {
                let path = out_dir.join(TREE_FILE);
                fs::write(&path, serde_json::to_string_pretty(&tree)?)?;
                files.push(path);
            }
            None => tracing::warn!(
                "Founder {} not found, skipping {}",
                self.ctx.founder_id(),
                TREE_FILE
            ),
        }

        let path = out_dir.join(ANOMALY_REPORT_FILE);
        fs::write(&path, self.render_anomaly_report(&report))?;
        files.push(path);

        let path = out_dir.join(MISSING_GENERATIONS_FILE);
        fs::write(&path, self.render_missing_generations())?;
        files.push(path);

        for file in &files {
            tracing::info!("Wrote {}", file.display());
        }
        Ok(ExportSummary { files, report })
    }

    /// Human-readable anomaly report.
    pub fn render_anomaly_report(&self, report: &ValidationReport) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_anomaly_report(&mut out, report);
        out
    }

    fn write_anomaly_report(&self, out: &mut String, report: &ValidationReport) -> fmt::Result {
        let limit = self.ctx.config.export.orphan_report_limit;
        let store = &self.ctx.store;

        writeln!(out, "{RULE}")?;
        writeln!(out, "ANOMALY REPORT: {}", self.ctx.config.lineage.family_name)?;
        writeln!(out, "{RULE}")?;

        section(out, "1. GENERATION MISMATCHES (child vs father)")?;
        if report.gen_mismatches.is_empty() {
            writeln!(out, "None found.")?;
        }
        for finding in &report.gen_mismatches {
            writeln!(out, "[{}] {}", finding.kind.code(), finding.message)?;
            if let FindingKind::GenMismatch { father_id, .. } = &finding.kind {
                writeln!(out, "    child: {}, father: {}", finding.person_id, father_id)?;
            }
        }

        section(out, "2. INVALID NAMES")?;
        if report.invalid_names.is_empty() {
            writeln!(out, "None found.")?;
        }
        for finding in &report.invalid_names {
            writeln!(out, "[{}] {}", finding.kind.code(), finding.message)?;
            let father = store
                .get(&finding.person_id)
                .and_then(|p| store.resolve(p.father_id.as_deref()));
            match father {
                Some(father) => writeln!(
                    out,
                    "    id: {} | father: {} ({})",
                    finding.person_id,
                    father.display_name(),
                    father.id
                )?,
                None => writeln!(out, "    id: {} | no father on record", finding.person_id)?,
            }
        }

        section(out, "3. UNLINKED CLAN MEMBERS")?;
        if report.orphans.is_empty() {
            writeln!(out, "None found.")?;
        }
        for finding in report.orphans.iter().take(limit) {
            writeln!(
                out,
                "[{}] {} (id: {})",
                finding.kind.code(),
                finding.person_name,
                finding.person_id
            )?;
        }
        if report.orphans.len() > limit {
            writeln!(out, "… and {} more", report.orphans.len() - limit)?;
        }

        if !report.traces.is_empty() {
            section(out, "4. IMPLAUSIBLE GENERATIONS")?;
        }
        for trace in &report.traces {
            let source = store
                .get(&trace.person_id)
                .and_then(|p| p.generation_source)
                .map_or_else(String::new, |s| format!(" ({s})"));
            writeln!(
                out,
                "{} ({}): computed generation {}{}",
                trace.person_name, trace.person_id, trace.computed, source
            )?;
            let Some(chain) = &trace.chain else {
                writeln!(out, "    no father chain to the founder")?;
                continue;
            };
            for link in chain {
                let recorded = link.recorded.map_or_else(|| "-".to_string(), |r| r.to_string());
                writeln!(
                    out,
                    "    {} {}: recorded {}, expected {}{}",
                    link.id,
                    link.name,
                    recorded,
                    link.expected,
                    if link.conflict { "  <-- conflict" } else { "" }
                )?;
            }
        }

        section(out, "SUMMARY")?;
        writeln!(out, "Total members: {}", store.len())?;
        writeln!(out, "Generation mismatches: {}", report.gen_mismatches.len())?;
        writeln!(out, "Invalid names: {}", report.invalid_names.len())?;
        writeln!(out, "Unlinked clan members: {}", report.orphans.len())?;
        writeln!(out, "Implausible generations: {}", report.traces.len())?;
        let dangling = store.dangling();
        writeln!(
            out,
            "Dangling references: {} (father {}, mother {}, spouse {})",
            dangling.total(),
            dangling.father,
            dangling.mother,
            dangling.spouse
        )
    }

    /// Tab-separated list of individuals left without a generation.
    pub fn render_missing_generations(&self) -> String {
        let store = &self.ctx.store;
        let mut out = String::from("id\tname\tfather_id\tfather_generation\tclan_member\n");
        for person in store.individuals().iter().filter(|p| p.generation.is_none()) {
            let father_generation = store
                .resolve(person.father_id.as_deref())
                .and_then(|f| f.generation)
                .map_or_else(|| "N/A".to_string(), |g| g.to_string());
            let clan_member = if self.ctx.clan.is_member(person) { "yes" } else { "no" };
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                person.id,
                person.display_name(),
                person.father_id.as_deref().unwrap_or("N/A"),
                father_generation,
                clan_member
            ));
        }
        out
    }
}

const RULE: &str = "========================================================================";

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{RULE}\n{title}\n{RULE}")
}
