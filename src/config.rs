//! Configuration System
//!
//! Layered configuration for the catalog engine: which extra load strata exist, extra
//! capability definitions, diagnostics retention and logging. Sources are merged by
//! [`ConfigLoader`]; see that type for precedence.

use crate::catalog::{Catalog, CatalogContext, Diagnostics};
use crate::error::CatalogError;
use crate::logging::LoggingConfig;
use crate::schema::SchemaRegistry;
use crate::stratum::common_strata::*;
use crate::stratum::StratumOrder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Stratum layout
    #[serde(default)]
    pub strata: StrataConfig,

    /// Extra capabilities: name to required attribute names
    #[serde(default)]
    pub capabilities: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Additional load strata, lowest precedence first. They sit between `load` and
    /// `underride`.
    #[serde(default)]
    pub load_strata: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Maximum number of diagnostics kept; 0 disables recording
    #[serde(default = "default_max_recorded")]
    pub max_recorded: usize,
}

fn default_max_recorded() -> usize {
    Diagnostics::DEFAULT_MAX_RECORDED
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            max_recorded: default_max_recorded(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Strata(String),
    Capability(String, String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Strata(msg) => write!(f, "Strata: {}", msg),
            ValidationError::Capability(name, msg) => {
                write!(f, "Capability '{}': {}", name, msg)
            }
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StrataConfig {
    pub fn validate(&self) -> Result<(), String> {
        let reserved = [DEFAULTS, DEFINITION, LOAD, UNDERRIDE, USER, OVERRIDE];
        let mut seen = HashSet::new();
        for name in &self.load_strata {
            if name.trim().is_empty() {
                return Err("Load stratum names cannot be empty".to_string());
            }
            if reserved.contains(&name.as_str()) {
                return Err(format!("'{}' is a built-in stratum", name));
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("Duplicate load stratum '{}'", name));
            }
        }
        Ok(())
    }

    pub fn build_order(&self) -> StratumOrder {
        self.load_strata
            .iter()
            .fold(StratumOrder::builder(), |builder, name| {
                builder.with_load_stratum(name.as_str())
            })
            .build()
    }
}

impl CatalogConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.strata.validate() {
            errors.push(ValidationError::Strata(e));
        }

        for (name, attributes) in &self.capabilities {
            if attributes.is_empty() {
                errors.push(ValidationError::Capability(
                    name.clone(),
                    "must require at least one attribute".to_string(),
                ));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Freeze a registry together with the configured stratum order and capabilities.
    pub fn build_context(
        &self,
        mut registry: SchemaRegistry,
    ) -> Result<CatalogContext, CatalogError> {
        self.validate().map_err(|errors| {
            CatalogError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        for (name, attributes) in &self.capabilities {
            registry.register_capability(name.clone(), attributes.clone());
        }
        Ok(CatalogContext::new(registry, self.strata.build_order()))
    }

    /// Empty catalog using this configuration.
    pub fn new_catalog(&self, registry: SchemaRegistry) -> Result<Catalog, CatalogError> {
        let context = self.build_context(registry)?;
        Ok(Catalog::with_diagnostics(
            context,
            Diagnostics::with_capacity(self.diagnostics.max_recorded),
        ))
    }
}
