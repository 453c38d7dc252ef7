//! CLI route: single route table and run context. Dispatches to the catalog and presentation.

use crate::catalog::Catalog;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_kinds_json, format_kinds_text, format_load_result_json, format_load_result_text,
    format_resolved_json, format_resolved_text, format_strata_json, format_strata_text,
    format_tree_json, format_tree_text, format_validate_result_json, format_validate_result_text,
    LoadOutcome, ValidateReport,
};
use crate::config::{CatalogConfig, ConfigLoader};
use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use crate::load::{load_all, JsonFileSource, StratumSource};
use crate::persist::{CatalogDocument, LoadWarning};
use crate::schema::{SchemaDocument, SchemaRegistry};
use crate::types::EntryId;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: configuration plus the loaded catalog.
pub struct RunContext {
    config: CatalogConfig,
    catalog: Catalog,
    warnings: Vec<LoadWarning>,
}

impl RunContext {
    /// Load configuration, schemas and the catalog document.
    pub fn new(
        workspace_root: &Path,
        config_path: Option<&Path>,
        catalog_path: &Path,
        schema_paths: &[PathBuf],
    ) -> Result<Self, CatalogError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        };

        let mut registry = SchemaRegistry::with_builtin()?;
        for path in schema_paths {
            SchemaDocument::from_path(path)?.apply(&mut registry)?;
            debug!(schema = %path.display(), "Applied schema document");
        }

        let mut catalog = config.new_catalog(registry)?;
        let warnings = catalog.load_document(CatalogDocument::from_path(catalog_path)?);
        info!(
            catalog = %catalog_path.display(),
            entries = catalog.len(),
            "Catalog loaded"
        );

        Ok(Self {
            config,
            catalog,
            warnings,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    fn find(&self, key: &str) -> Result<&CatalogEntry, CatalogError> {
        self.catalog
            .get_by_id_or_share_key(key)
            .ok_or_else(|| CatalogError::EntryNotFound(EntryId::from(key)))
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&mut self, command: &Commands) -> Result<String, CatalogError> {
        match command {
            Commands::Tree { root, format } => self.handle_tree(root.as_deref(), format),
            Commands::Resolve {
                entry,
                attribute,
                format,
            } => self.handle_resolve(entry, attribute.as_deref(), format),
            Commands::Strata {
                entry,
                attribute,
                format,
            } => self.handle_strata(entry, attribute.as_deref(), format),
            Commands::Validate { format } => self.handle_validate(format),
            Commands::Kinds { format } => {
                let registry = &self.catalog.context().registry;
                if format == "json" {
                    format_kinds_json(registry)
                } else {
                    Ok(format_kinds_text(registry))
                }
            }
            Commands::Load {
                sources,
                output,
                format,
            } => self.handle_load(sources, output.as_deref(), format),
        }
    }

    fn handle_tree(&self, root: Option<&str>, format: &str) -> Result<String, CatalogError> {
        let roots = match root {
            Some(key) => vec![self.find(key)?],
            None => self.catalog.roots(),
        };
        if format == "json" {
            format_tree_json(&self.catalog, &roots)
        } else {
            Ok(format_tree_text(&self.catalog, &roots))
        }
    }

    fn handle_resolve(
        &self,
        key: &str,
        attribute: Option<&str>,
        format: &str,
    ) -> Result<String, CatalogError> {
        let entry = self.find(key)?;
        let values = match attribute {
            Some(attribute) => vec![(attribute.to_string(), entry.resolve(attribute)?)],
            None => entry.resolve_all(),
        };
        if format == "json" {
            format_resolved_json(entry, &values)
        } else {
            Ok(format_resolved_text(entry, &values))
        }
    }

    fn handle_strata(
        &self,
        key: &str,
        attribute: Option<&str>,
        format: &str,
    ) -> Result<String, CatalogError> {
        let entry = self.find(key)?;
        if let Some(attribute) = attribute {
            entry.schema().describe(attribute)?;
        }
        if format == "json" {
            format_strata_json(entry, attribute)
        } else {
            Ok(format_strata_text(entry, attribute))
        }
    }

    fn handle_validate(&self, format: &str) -> Result<String, CatalogError> {
        self.catalog.take_diagnostics();
        self.catalog.check_references();
        let report = ValidateReport {
            entries: self.catalog.len(),
            warnings: self.warnings.clone(),
            diagnostics: self.catalog.take_diagnostics(),
        };
        if format == "json" {
            format_validate_result_json(&report)
        } else {
            Ok(format_validate_result_text(&report))
        }
    }

    fn handle_load(
        &mut self,
        paths: &[PathBuf],
        output: Option<&Path>,
        format: &str,
    ) -> Result<String, CatalogError> {
        let sources: Vec<Box<dyn StratumSource>> = paths
            .iter()
            .map(|path| Box::new(JsonFileSource::new(path)) as Box<dyn StratumSource>)
            .collect();

        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        let results = runtime.block_on(load_all(&mut self.catalog, &sources));

        let outcomes: Vec<LoadOutcome> = sources
            .iter()
            .zip(results)
            .map(|(source, result)| LoadOutcome {
                source: source.describe(),
                applied: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            })
            .collect();

        if let Some(output) = output {
            self.catalog.to_document().to_path(output)?;
            info!(output = %output.display(), "Wrote catalog document");
        }

        if format == "json" {
            format_load_result_json(&outcomes)
        } else {
            Ok(format_load_result_text(&outcomes))
        }
    }
}
