//! Configuration loader: merges every source into a [`CatalogConfig`].

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::CatalogConfig;
use crate::error::CatalogError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads configuration with precedence (lowest to highest):
///
/// 1. Built-in defaults
/// 2. Global file: `$XDG_CONFIG_HOME/catalog-strata/config.toml`
/// 3. Workspace files: `config/config.toml`, then `config/{CATALOG_STRATA_ENV}.toml`
/// 4. Environment variables prefixed `CATALOG_STRATA__` (e.g. `CATALOG_STRATA__DIAGNOSTICS__MAX_RECORDED`)
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(workspace_root: &Path) -> Result<CatalogConfig, CatalogError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: CatalogConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            load_strata = config.strata.load_strata.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load a single explicit file on top of the defaults. TOML, JSON and YAML are
    /// detected from the extension.
    pub fn load_from_file(path: &Path) -> Result<CatalogConfig, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}
