//! Shared presentation: headings plus validate, kinds and load formatters.

use crate::catalog::Diagnostic;
use crate::error::CatalogError;
use crate::persist::LoadWarning;
use crate::schema::SchemaRegistry;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Outcome of `validate`: document warnings plus references that did not resolve.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub entries: usize,
    pub warnings: Vec<LoadWarning>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidateReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.diagnostics.is_empty()
    }
}

pub fn format_validate_result_text(report: &ValidateReport) -> String {
    if report.is_clean() {
        return format!(
            "Validation passed:\n  Entries: {}\n  All checks passed",
            report.entries
        );
    }
    let mut s = format!(
        "Validation completed with issues:\n  Entries: {}",
        report.entries
    );
    if !report.warnings.is_empty() {
        s.push_str(&format!("\n\nWarnings ({}):", report.warnings.len()));
        for w in &report.warnings {
            s.push_str(&format!("\n  - {}", w));
        }
    }
    if !report.diagnostics.is_empty() {
        s.push_str(&format!(
            "\n\nUnknown references ({}):",
            report.diagnostics.len()
        ));
        for d in &report.diagnostics {
            s.push_str(&format!("\n  - {}", d));
        }
    }
    s
}

pub fn format_validate_result_json(report: &ValidateReport) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[derive(Debug, Clone, Serialize)]
struct KindSummary<'a> {
    kind: &'a str,
    group: bool,
    attributes: Vec<&'a str>,
    capabilities: Vec<&'a str>,
}

fn kind_summaries(registry: &SchemaRegistry) -> Vec<KindSummary<'_>> {
    registry
        .kinds()
        .map(|schema| KindSummary {
            kind: schema.kind(),
            group: schema.is_group(),
            attributes: schema.attribute_names().collect(),
            capabilities: registry.capabilities().satisfied_by(schema),
        })
        .collect()
}

pub fn format_kinds_text(registry: &SchemaRegistry) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Kinds")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kind", "Group", "Attributes", "Capabilities"]);
    for summary in kind_summaries(registry) {
        table.add_row(vec![
            summary.kind.to_string(),
            if summary.group { "yes" } else { "no" }.to_string(),
            summary.attributes.join(", "),
            summary.capabilities.join(", "),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_kinds_json(registry: &SchemaRegistry) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(&kind_summaries(registry))?)
}

/// One row per staged source: where it came from and whether it was applied.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub source: String,
    pub applied: bool,
    pub error: Option<String>,
}

pub fn format_load_result_text(outcomes: &[LoadOutcome]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Loaded strata")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Source", "Applied", "Error"]);
    for row in outcomes {
        let applied = if row.applied {
            format!("{}", "yes".green())
        } else {
            format!("{}", "no".red())
        };
        table.add_row(vec![
            row.source.clone(),
            applied,
            row.error.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_load_result_json(outcomes: &[LoadOutcome]) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}
