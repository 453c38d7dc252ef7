//! Catalog documents: strata-aware serialization.
//!
//! An entry serializes as `{id, type, strata: {stratumId: {attribute: raw}}, shareKeys?}` and a
//! catalog as `{entries: [...]}`. Raw strata are stored as written, tombstones included, so a
//! round trip reproduces the same resolution.
//!
//! Loading is tolerant: problems with individual entries, strata or values are reported as
//! [`LoadWarning`]s and skipped. Membership is applied once every entry exists.

use crate::catalog::{Catalog, CatalogContext, NewEntry};
use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use crate::schema::builtin::MEMBERS;
use crate::stratum::common_strata::DEFINITION;
use crate::stratum::stack::TombstonePolicy;
use crate::types::{EntryId, RawValue, StratumId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

pub type StratumDocument = IndexMap<String, RawValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDocument {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub strata: IndexMap<StratumId, StratumDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub share_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub entries: Vec<EntryDocument>,
}

impl CatalogDocument {
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn to_path(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// A recoverable problem found while loading a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum LoadWarning {
    UnknownKind { entry: EntryId, kind: String },
    DuplicateEntry { entry: EntryId },
    RejectedEntry { entry: EntryId, reason: String },
    UnknownStratum { entry: EntryId, stratum: StratumId },
    RejectedValue {
        entry: EntryId,
        stratum: StratumId,
        attribute: String,
        reason: String,
    },
    RejectedShareKey { entry: EntryId, key: String, reason: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::UnknownKind { entry, kind } => {
                write!(f, "{}: unknown kind '{}', entry skipped", entry, kind)
            }
            LoadWarning::DuplicateEntry { entry } => {
                write!(f, "{}: duplicate entry, later definition skipped", entry)
            }
            LoadWarning::RejectedEntry { entry, reason } => {
                write!(f, "{}: entry skipped: {}", entry, reason)
            }
            LoadWarning::UnknownStratum { entry, stratum } => {
                write!(f, "{}: unknown stratum '{}' skipped", entry, stratum)
            }
            LoadWarning::RejectedValue {
                entry,
                stratum,
                attribute,
                reason,
            } => write!(f, "{}.{} in '{}' skipped: {}", entry, attribute, stratum, reason),
            LoadWarning::RejectedShareKey { entry, key, reason } => {
                write!(f, "{}: share key '{}' skipped: {}", entry, key, reason)
            }
        }
    }
}

impl CatalogEntry {
    /// Raw strata of this entry, lowest precedence first. Share keys live on the
    /// catalog and are filled in by [`Catalog::to_document`].
    pub fn to_document(&self) -> EntryDocument {
        EntryDocument {
            id: self.id().clone(),
            kind: self.kind().to_string(),
            strata: self
                .strata()
                .bottom_to_top()
                .map(|(id, stratum)| {
                    let values = stratum
                        .iter()
                        .map(|(attr, value)| (attr.to_string(), value.clone()))
                        .collect();
                    (id.clone(), values)
                })
                .collect(),
            share_keys: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            entries: self
                .entries()
                .map(|entry| {
                    let mut doc = entry.to_document();
                    doc.share_keys = self
                        .share_keys_of(entry.id().as_str())
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    doc
                })
                .collect(),
        }
    }

    /// Build a catalog from a document, collecting warnings for everything skipped.
    pub fn from_document(
        context: CatalogContext,
        document: CatalogDocument,
    ) -> (Catalog, Vec<LoadWarning>) {
        let mut catalog = Catalog::new(context);
        let warnings = catalog.load_document(document);
        (catalog, warnings)
    }

    /// Merge a document into this catalog. Existing entries of the same kind gain the
    /// document's strata values.
    pub fn load_document(&mut self, document: CatalogDocument) -> Vec<LoadWarning> {
        let mut warnings = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut deferred: Vec<(EntryId, StratumId, RawValue)> = Vec::new();
        let definition = StratumId::from(DEFINITION);

        for doc in document.entries {
            if !seen.insert(doc.id.clone()) {
                warnings.push(LoadWarning::DuplicateEntry { entry: doc.id });
                continue;
            }
            if self.registry().kind(&doc.kind).is_err() {
                warnings.push(LoadWarning::UnknownKind {
                    entry: doc.id,
                    kind: doc.kind,
                });
                continue;
            }
            let new = NewEntry::new(doc.id.clone(), doc.kind.clone());
            if let Err(e) = self.add_entry(new, None, &definition) {
                warnings.push(LoadWarning::RejectedEntry {
                    entry: doc.id,
                    reason: e.to_string(),
                });
                continue;
            }

            for (stratum, values) in doc.strata {
                if !self.order().contains(stratum.as_str()) {
                    warnings.push(LoadWarning::UnknownStratum {
                        entry: doc.id.clone(),
                        stratum,
                    });
                    continue;
                }
                if let Err(e) = self.get_or_create_stratum(doc.id.as_str(), &stratum) {
                    warnings.push(rejected(&doc.id, &stratum, "*", &e));
                    continue;
                }
                for (attribute, value) in values {
                    if attribute == MEMBERS {
                        deferred.push((doc.id.clone(), stratum.clone(), value));
                        continue;
                    }
                    if let Err(e) = self.set_raw_value_with(
                        doc.id.as_str(),
                        &stratum,
                        &attribute,
                        value,
                        TombstonePolicy::Allow,
                    ) {
                        warnings.push(rejected(&doc.id, &stratum, &attribute, &e));
                    }
                }
            }

            for key in doc.share_keys {
                if let Err(e) = self.add_share_key(doc.id.as_str(), key.clone()) {
                    warnings.push(LoadWarning::RejectedShareKey {
                        entry: doc.id.clone(),
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for (id, stratum, value) in deferred {
            if let Err(e) = self.set_raw_value_with(
                id.as_str(),
                &stratum,
                MEMBERS,
                value,
                TombstonePolicy::Allow,
            ) {
                warnings.push(rejected(&id, &stratum, MEMBERS, &e));
            }
        }

        for warning in &warnings {
            warn!(%warning, "Catalog document warning");
        }
        info!(
            entries = self.len(),
            warnings = warnings.len(),
            "Loaded catalog document"
        );
        warnings
    }
}

fn rejected(
    entry: &EntryId,
    stratum: &StratumId,
    attribute: &str,
    error: &CatalogError,
) -> LoadWarning {
    LoadWarning::RejectedValue {
        entry: entry.clone(),
        stratum: stratum.clone(),
        attribute: attribute.to_string(),
        reason: error.to_string(),
    }
}
