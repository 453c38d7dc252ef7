//! Tree presentation: hierarchy as indented text or nested JSON.

use crate::catalog::Catalog;
use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use owo_colors::OwoColorize;
use serde_json::{json, Value};

use super::shared::format_section_heading;

fn display_name(entry: &CatalogEntry) -> Option<String> {
    entry
        .resolve("name")
        .ok()
        .and_then(|r| r.as_str().map(str::to_string))
}

pub fn format_tree_text(catalog: &Catalog, roots: &[&CatalogEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Catalog")));
    if roots.is_empty() {
        out.push_str("Catalog is empty.\n");
        return out;
    }
    for root in roots {
        let walk = match catalog.walk(root.id().as_str()) {
            Ok(walk) => walk,
            Err(_) => continue,
        };
        for (depth, entry) in walk {
            let indent = "  ".repeat(depth);
            let id = if entry.is_group() {
                format!("{}", entry.id().bold())
            } else {
                entry.id().to_string()
            };
            let label = match display_name(entry) {
                Some(name) => format!("{} {}", id, format!("({})", name).dimmed()),
                None => id,
            };
            out.push_str(&format!("{}{} [{}]\n", indent, label, entry.kind()));
        }
    }
    out
}

fn node_json(catalog: &Catalog, entry: &CatalogEntry) -> Value {
    let mut node = json!({
        "id": entry.id(),
        "kind": entry.kind(),
        "name": display_name(entry),
    });
    if entry.is_group() {
        let children: Vec<Value> = catalog
            .resolve_children(entry.id().as_str())
            .unwrap_or_default()
            .into_iter()
            .map(|child| node_json(catalog, child))
            .collect();
        node["members"] = Value::Array(children);
    }
    node
}

pub fn format_tree_json(
    catalog: &Catalog,
    roots: &[&CatalogEntry],
) -> Result<String, CatalogError> {
    let nodes: Vec<Value> = roots.iter().map(|root| node_json(catalog, root)).collect();
    Ok(serde_json::to_string_pretty(&json!({ "roots": nodes }))?)
}
