//! CLI presentation: text and json formatters per command family.

mod entry;
mod shared;
mod tree;

pub use entry::{format_resolved_json, format_resolved_text, format_strata_json, format_strata_text};
pub use shared::{
    format_kinds_json, format_kinds_text, format_load_result_json, format_load_result_text,
    format_validate_result_json, format_validate_result_text, LoadOutcome, ValidateReport,
};
pub use tree::{format_tree_json, format_tree_text};
