//! Catalog entries: an id, a composed schema, a stratum stack, and a memo of
//! resolved attribute values.
//!
//! Entries are created and mutated through [`crate::catalog::Catalog`], which owns
//! structural invariants (membership cycles, tombstones). Reads go through
//! [`CatalogEntry::resolve`].

use crate::error::{SchemaError, StratumError};
use crate::resolve::{resolve_attribute, CacheStats, ResolutionCache, Resolved};
use crate::schema::{CapabilityTable, ComposedSchema};
use crate::stratum::stack::TombstonePolicy;
use crate::stratum::{Stratum, StratumOrder, StratumStack};
use crate::types::{EntryId, RawValue, StratumId};
use std::cell::RefCell;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
pub struct CatalogEntry {
    id: EntryId,
    stack: StratumStack,
    cache: RefCell<ResolutionCache>,
}

impl CatalogEntry {
    pub fn new(id: EntryId, schema: Arc<ComposedSchema>, order: Arc<StratumOrder>) -> Self {
        Self {
            id,
            stack: StratumStack::new(schema, order),
            cache: RefCell::new(ResolutionCache::default()),
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn kind(&self) -> &str {
        self.stack.schema().kind()
    }

    pub fn schema(&self) -> &Arc<ComposedSchema> {
        self.stack.schema()
    }

    pub fn strata(&self) -> &StratumStack {
        &self.stack
    }

    pub fn is_group(&self) -> bool {
        self.schema().is_group()
    }

    /// Effective value of an attribute, memoized until a write touches it.
    pub fn resolve(&self, attribute: &str) -> Result<Resolved, SchemaError> {
        let descriptor = self.schema().describe(attribute)?;
        if let Some(hit) = self.cache.borrow_mut().get(attribute) {
            return Ok(hit);
        }
        let resolved = resolve_attribute(&self.stack, descriptor);
        trace!(entry = %self.id, attribute, "Resolved attribute");
        self.cache.borrow_mut().insert(attribute, resolved.clone());
        Ok(resolved)
    }

    /// Resolve every declared attribute, in declaration order.
    pub fn resolve_all(&self) -> Vec<(String, Resolved)> {
        self.schema()
            .attribute_names()
            .filter_map(|name| self.resolve(name).ok().map(|r| (name.to_string(), r)))
            .collect()
    }

    pub fn has_capability(&self, table: &CapabilityTable, capability: &str) -> bool {
        table.is_satisfied_by(self.schema(), capability)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    pub fn is_cached(&self, attribute: &str) -> bool {
        self.cache.borrow().is_cached(attribute)
    }

    /// Create the stratum if needed. A newly created stratum conservatively
    /// invalidates every attribute.
    pub(crate) fn get_or_create_stratum(&mut self, id: &StratumId) -> Result<(), StratumError> {
        let (_, created) = self.stack.get_or_create(id)?;
        if created {
            self.cache.get_mut().invalidate_all();
        }
        Ok(())
    }

    pub(crate) fn check_write(
        &self,
        stratum: &StratumId,
        attribute: &str,
        value: &RawValue,
        tombstones: TombstonePolicy,
    ) -> Result<(), StratumError> {
        self.stack.check_write(stratum, attribute, value, tombstones)
    }

    pub(crate) fn set_raw_value(
        &mut self,
        stratum: &StratumId,
        attribute: &str,
        value: RawValue,
        tombstones: TombstonePolicy,
    ) -> Result<WriteUndo, StratumError> {
        let (previous, created) = self
            .stack
            .set_raw_value(stratum, attribute, value, tombstones)?;
        if created {
            self.cache.get_mut().invalidate_all();
        } else {
            self.cache.get_mut().invalidate(attribute);
        }
        Ok(WriteUndo {
            stratum: stratum.clone(),
            attribute: attribute.to_string(),
            previous,
            created,
        })
    }

    pub(crate) fn clear_raw_value(
        &mut self,
        stratum: &StratumId,
        attribute: &str,
    ) -> Result<WriteUndo, StratumError> {
        let previous = self.stack.clear_raw_value(stratum, attribute)?;
        self.cache.get_mut().invalidate(attribute);
        Ok(WriteUndo {
            stratum: stratum.clone(),
            attribute: attribute.to_string(),
            previous,
            created: false,
        })
    }

    pub(crate) fn undo_write(&mut self, undo: WriteUndo) {
        self.stack
            .restore_raw_value(&undo.stratum, &undo.attribute, undo.previous, undo.created);
        if undo.created {
            self.cache.get_mut().invalidate_all();
        } else {
            self.cache.get_mut().invalidate(&undo.attribute);
        }
    }

    /// Remove a stratum, invalidating only the attributes it defined.
    pub(crate) fn delete_stratum(&mut self, id: &str) -> Option<Stratum> {
        let removed = self.stack.delete_stratum(id)?;
        let cache = self.cache.get_mut();
        for attribute in removed.attribute_names() {
            cache.invalidate(attribute);
        }
        Some(removed)
    }

    pub(crate) fn restore_stratum(&mut self, id: &StratumId, stratum: Stratum) {
        let cache = self.cache.get_mut();
        for attribute in stratum.attribute_names() {
            cache.invalidate(attribute);
        }
        self.stack.restore_stratum(id, stratum);
    }
}

/// What a single write replaced, so a rejected structural change can be rolled back.
#[derive(Debug, Clone)]
pub(crate) struct WriteUndo {
    stratum: StratumId,
    attribute: String,
    previous: Option<RawValue>,
    created: bool,
}
