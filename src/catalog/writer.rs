//! Write handle bound to one stratum of one entry.

use super::Catalog;
use crate::error::CatalogError;
use crate::types::{EntryId, RawValue, StratumId};

/// Returned by [`Catalog::stratum_writer`]. All writes go through the catalog, so
/// schema checks and membership cycle checks still apply.
pub struct StratumWriter<'a> {
    catalog: &'a mut Catalog,
    entry: EntryId,
    stratum: StratumId,
}

impl<'a> StratumWriter<'a> {
    pub(crate) fn new(catalog: &'a mut Catalog, entry: EntryId, stratum: StratumId) -> Self {
        Self {
            catalog,
            entry,
            stratum,
        }
    }

    pub fn entry(&self) -> &EntryId {
        &self.entry
    }

    pub fn stratum(&self) -> &StratumId {
        &self.stratum
    }

    /// Raw value in this stratum only.
    pub fn get(&self, attribute: &str) -> Option<&RawValue> {
        self.catalog
            .entry(self.entry.as_str())
            .and_then(|e| e.strata().raw_value(self.stratum.as_str(), attribute))
    }

    pub fn set(&mut self, attribute: &str, value: RawValue) -> Result<&mut Self, CatalogError> {
        self.catalog
            .set_raw_value(self.entry.as_str(), &self.stratum, attribute, value)?;
        Ok(self)
    }

    pub fn clear(&mut self, attribute: &str) -> Result<&mut Self, CatalogError> {
        self.catalog
            .clear_raw_value(self.entry.as_str(), &self.stratum, attribute)?;
        Ok(self)
    }
}
