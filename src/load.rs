//! Loadable strata.
//!
//! Sources fetch attribute values asynchronously (remote documents, files) and hand back a
//! [`StagedStratum`]. Nothing touches the catalog until the staged values are committed with
//! [`Catalog::commit_staged`], which validates everything up front and applies it as one write.

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::types::{EntryId, RawValue, StratumId};
use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Attribute values for one stratum of one entry, not yet applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedStratum {
    pub entry: EntryId,
    pub stratum: StratumId,
    #[serde(default)]
    pub values: IndexMap<String, RawValue>,
}

impl StagedStratum {
    pub fn new(entry: impl Into<EntryId>, stratum: impl Into<StratumId>) -> Self {
        Self {
            entry: entry.into(),
            stratum: stratum.into(),
            values: IndexMap::new(),
        }
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: RawValue) -> &mut Self {
        self.values.insert(attribute.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Something that can produce a staged stratum.
#[async_trait]
pub trait StratumSource: Send + Sync {
    async fn fetch(&self) -> Result<StagedStratum, CatalogError>;

    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;
}

/// Reads a staged stratum from a JSON file of the form
/// `{"entry": "...", "stratum": "...", "values": {...}}`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StratumSource for JsonFileSource {
    async fn fetch(&self) -> Result<StagedStratum, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CatalogError::LoadFailed(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::LoadFailed(format!("{}: {}", self.path.display(), e)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A source that already holds its values.
#[derive(Debug, Clone)]
pub struct StaticSource {
    staged: StagedStratum,
}

impl StaticSource {
    pub fn new(staged: StagedStratum) -> Self {
        Self { staged }
    }
}

#[async_trait]
impl StratumSource for StaticSource {
    async fn fetch(&self) -> Result<StagedStratum, CatalogError> {
        Ok(self.staged.clone())
    }

    fn describe(&self) -> String {
        format!("static:{}/{}", self.staged.entry, self.staged.stratum)
    }
}

/// Fetch from one source and commit the result atomically.
pub async fn load_stratum(
    catalog: &mut Catalog,
    source: &dyn StratumSource,
) -> Result<(), CatalogError> {
    let staged = source.fetch().await?;
    debug!(source = %source.describe(), attributes = staged.len(), "Fetched stratum");
    catalog.commit_staged(staged)
}

/// Fetch from all sources concurrently, then commit each result in input order.
/// One failing source does not prevent the others from being applied.
pub async fn load_all(
    catalog: &mut Catalog,
    sources: &[Box<dyn StratumSource>],
) -> Vec<Result<(), CatalogError>> {
    let fetched = join_all(sources.iter().map(|source| source.fetch())).await;
    fetched
        .into_iter()
        .zip(sources)
        .map(|(result, source)| {
            let outcome = result.and_then(|staged| catalog.commit_staged(staged));
            if let Err(e) = &outcome {
                warn!(source = %source.describe(), error = %e, "Stratum load failed");
            }
            outcome
        })
        .collect()
}
