//! Entry presentation: resolved values and raw strata.

use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use crate::resolve::Resolved;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};

use super::shared::format_section_heading;

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn resolved_text(resolved: &Resolved) -> String {
    match resolved {
        Resolved::Unset => format!("{}", "(unset)".dimmed()),
        Resolved::Value(value) => raw_text(value),
    }
}

pub fn format_resolved_text(entry: &CatalogEntry, values: &[(String, Resolved)]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("{} [{}]", entry.id(), entry.kind()))
    ));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Attribute", "Value", "Merge"]);
    for (name, resolved) in values {
        let merge = entry
            .schema()
            .describe(name)
            .map(|d| d.merge_policy().to_string())
            .unwrap_or_default();
        table.add_row(vec![name.clone(), resolved_text(resolved), merge]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Unset attributes are listed separately so they are not confused with `null`.
pub fn format_resolved_json(
    entry: &CatalogEntry,
    values: &[(String, Resolved)],
) -> Result<String, CatalogError> {
    let mut attributes = Map::new();
    let mut unset = Vec::new();
    for (name, resolved) in values {
        match resolved {
            Resolved::Value(value) => {
                attributes.insert(name.clone(), value.clone());
            }
            Resolved::Unset => unset.push(name.clone()),
        }
    }
    let out = json!({
        "entry": entry.id(),
        "kind": entry.kind(),
        "attributes": attributes,
        "unset": unset,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn format_strata_text(entry: &CatalogEntry, attribute: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("{} strata", entry.id()))
    ));
    if entry.strata().is_empty() {
        out.push_str("No strata defined.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Stratum", "Attribute", "Raw value"]);
    for (stratum_id, stratum) in entry.strata().top_to_bottom() {
        for (name, value) in stratum.iter() {
            if attribute.map(|a| a == name).unwrap_or(true) {
                table.add_row(vec![stratum_id.to_string(), name.to_string(), raw_text(value)]);
            }
        }
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_strata_json(
    entry: &CatalogEntry,
    attribute: Option<&str>,
) -> Result<String, CatalogError> {
    let mut document = entry.to_document();
    if let Some(attribute) = attribute {
        for values in document.strata.values_mut() {
            values.retain(|name, _| name == attribute);
        }
    }
    Ok(serde_json::to_string_pretty(&document)?)
}
