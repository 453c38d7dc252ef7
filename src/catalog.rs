//! Catalog Tree
//!
//! Global registry of catalog entries plus the structural operations on the
//! group/item hierarchy. Groups hold their members in the `members` reference
//! array; the hierarchy is expanded lazily from resolved membership.
//!
//! Every structural mutation is all-or-nothing: writes that would create a
//! membership cycle are rolled back and reported as [`CatalogError::Cycle`].

pub mod diagnostics;
pub mod tree;
pub mod writer;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use tree::CatalogWalk;
pub use writer::StratumWriter;

use crate::entry::{CatalogEntry, WriteUndo};
use crate::error::{CatalogError, SchemaError};
use crate::load::StagedStratum;
use crate::reference::{parse_reference_array, to_raw_array, ModelReference};
use crate::resolve::Resolved;
use crate::schema::builtin::MEMBERS;
use crate::schema::SchemaRegistry;
use crate::stratum::stack::TombstonePolicy;
use crate::stratum::StratumOrder;
use crate::types::{EntryId, RawValue, StratumId};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-only state shared by every entry: the schema registry and the stratum order.
#[derive(Debug, Clone)]
pub struct CatalogContext {
    pub registry: Arc<SchemaRegistry>,
    pub order: Arc<StratumOrder>,
}

impl CatalogContext {
    pub fn new(registry: SchemaRegistry, order: StratumOrder) -> Self {
        Self {
            registry: Arc::new(registry),
            order: Arc::new(order),
        }
    }

    /// Built-in schemas with the default stratum order.
    pub fn builtin() -> Result<Self, SchemaError> {
        Ok(Self::new(
            SchemaRegistry::with_builtin()?,
            StratumOrder::default(),
        ))
    }
}

/// Request to create an entry of a registered kind.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub id: EntryId,
    pub kind: String,
}

impl NewEntry {
    pub fn new(id: impl Into<EntryId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

pub struct Catalog {
    context: CatalogContext,
    entries: IndexMap<EntryId, CatalogEntry>,
    share_keys: HashMap<String, EntryId>,
    diagnostics: RefCell<Diagnostics>,
}

impl Catalog {
    pub fn new(context: CatalogContext) -> Self {
        Self::with_diagnostics(context, Diagnostics::default())
    }

    pub fn with_diagnostics(context: CatalogContext, diagnostics: Diagnostics) -> Self {
        Self {
            context,
            entries: IndexMap::new(),
            share_keys: HashMap::new(),
            diagnostics: RefCell::new(diagnostics),
        }
    }

    pub fn context(&self) -> &CatalogContext {
        &self.context
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.context.registry
    }

    pub fn order(&self) -> &StratumOrder {
        &self.context.order
    }

    // ---- registry ---------------------------------------------------------

    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntryId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn require(&self, id: &str) -> Result<&CatalogEntry, CatalogError> {
        self.entries
            .get(id)
            .ok_or_else(|| CatalogError::EntryNotFound(EntryId::from(id)))
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut CatalogEntry, CatalogError> {
        self.entries
            .get_mut(id)
            .ok_or_else(|| CatalogError::EntryNotFound(EntryId::from(id)))
    }

    fn require_group(&self, id: &str) -> Result<&CatalogEntry, CatalogError> {
        let entry = self.require(id)?;
        if !entry.is_group() {
            return Err(CatalogError::NotAGroup(entry.id().clone()));
        }
        Ok(entry)
    }

    /// Look up an entry by id, falling back to share keys.
    pub fn get_by_id_or_share_key(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key).or_else(|| {
            self.share_keys
                .get(key)
                .and_then(|id| self.entries.get(id.as_str()))
        })
    }

    /// Register an alternative id for an entry. A key equal to the id is ignored.
    pub fn add_share_key(&mut self, id: &str, key: impl Into<String>) -> Result<(), CatalogError> {
        let key = key.into();
        let entry_id = self.require(id)?.id().clone();
        if key == entry_id.as_str() {
            return Ok(());
        }
        match self.share_keys.get(&key) {
            Some(existing) if *existing == entry_id => Ok(()),
            Some(existing) => Err(CatalogError::ShareKeyConflict {
                key,
                existing: existing.clone(),
            }),
            None => {
                self.share_keys.insert(key, entry_id);
                Ok(())
            }
        }
    }

    pub fn share_keys_of(&self, id: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .share_keys
            .iter()
            .filter(|(_, target)| target.as_str() == id)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    // ---- structure --------------------------------------------------------

    /// Create an entry (if not already present) and optionally append it to a
    /// group's membership in the given stratum.
    pub fn add_entry(
        &mut self,
        new: NewEntry,
        parent: Option<&EntryId>,
        stratum: &StratumId,
    ) -> Result<&CatalogEntry, CatalogError> {
        let schema = self.context.registry.kind(&new.kind)?;
        self.context.order.require_rank(stratum)?;

        let exists = match self.entries.get(new.id.as_str()) {
            Some(existing) if existing.kind() != new.kind => {
                return Err(CatalogError::KindMismatch {
                    id: new.id,
                    existing: existing.kind().to_string(),
                    requested: new.kind,
                })
            }
            Some(_) => true,
            None => false,
        };

        if let Some(parent) = parent {
            self.require_group(parent.as_str())?;
            // A fresh entry has no members, so it can only close a cycle with itself.
            let cycle = if exists {
                self.would_create_cycle(parent, &new.id)
            } else {
                *parent == new.id
            };
            if cycle {
                return Err(CatalogError::Cycle {
                    parent: parent.clone(),
                    child: new.id,
                });
            }
        }

        if !exists {
            debug!(entry = %new.id, kind = %new.kind, "Adding catalog entry");
            let entry = CatalogEntry::new(
                new.id.clone(),
                schema,
                Arc::clone(&self.context.order),
            );
            self.entries.insert(new.id.clone(), entry);
        }

        if let Some(parent) = parent {
            if let Err(e) = self.append_member(parent, &new.id, stratum) {
                if !exists {
                    self.entries.shift_remove(new.id.as_str());
                }
                return Err(e);
            }
        }

        self.require(new.id.as_str())
    }

    /// Add an existing entry to an existing group in the given stratum.
    pub fn add_member(
        &mut self,
        parent: &EntryId,
        child: &EntryId,
        stratum: &StratumId,
    ) -> Result<(), CatalogError> {
        self.require_group(parent.as_str())?;
        self.require(child.as_str())?;
        self.context.order.require_rank(stratum)?;
        if self.would_create_cycle(parent, child) {
            return Err(CatalogError::Cycle {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        self.append_member(parent, child, stratum)
    }

    fn append_member(
        &mut self,
        parent: &EntryId,
        child: &EntryId,
        stratum: &StratumId,
    ) -> Result<(), CatalogError> {
        let group = self.require_mut(parent.as_str())?;
        let mut references = group
            .strata()
            .raw_value(stratum.as_str(), MEMBERS)
            .map(parse_reference_array)
            .unwrap_or_default();

        // Re-adding replaces this stratum's own tombstone for the id.
        references.retain(|r| !(r.is_removed() && r.target() == child));
        if !references.iter().any(|r| r.target() == child) {
            references.push(ModelReference::id(child.clone()));
        }

        group.set_raw_value(
            stratum,
            MEMBERS,
            to_raw_array(&references),
            TombstonePolicy::Allow,
        )?;
        debug!(group = %parent, member = %child, stratum = %stratum, "Added member");
        Ok(())
    }

    /// Strata-aware removal: tombstone the id in `stratum` of every group where it
    /// currently resolves as a member. Lower strata are left untouched. Returns the
    /// groups that were updated.
    pub fn remove_entry(
        &mut self,
        id: &EntryId,
        stratum: &StratumId,
    ) -> Result<Vec<EntryId>, CatalogError> {
        self.context.order.require_rank(stratum)?;
        let parents = self.parents_of(id);
        for parent in &parents {
            let group = self.require_mut(parent.as_str())?;
            let mut references = group
                .strata()
                .raw_value(stratum.as_str(), MEMBERS)
                .map(parse_reference_array)
                .unwrap_or_default();

            let tombstone = ModelReference::tombstone(id.clone());
            match references.iter().position(|r| r.target() == id) {
                Some(i) => references[i] = tombstone,
                None => references.push(tombstone),
            }

            group.set_raw_value(
                stratum,
                MEMBERS,
                to_raw_array(&references),
                TombstonePolicy::Allow,
            )?;
        }
        info!(entry = %id, stratum = %stratum, groups = parents.len(), "Removed entry from groups");
        Ok(parents)
    }

    /// Absolute removal: drop the entry from the registry. References held by other
    /// entries are left alone and resolve as not found.
    pub fn delete_entry(&mut self, id: &EntryId) -> Result<CatalogEntry, CatalogError> {
        let entry = self
            .entries
            .shift_remove(id.as_str())
            .ok_or_else(|| CatalogError::EntryNotFound(id.clone()))?;
        self.share_keys.retain(|_, target| target != id);
        info!(entry = %id, "Deleted entry from catalog");
        Ok(entry)
    }

    // ---- attribute access -------------------------------------------------

    pub fn resolve(&self, id: &str, attribute: &str) -> Result<Resolved, CatalogError> {
        Ok(self.require(id)?.resolve(attribute)?)
    }

    pub fn get_or_create_stratum(
        &mut self,
        id: &str,
        stratum: &StratumId,
    ) -> Result<(), CatalogError> {
        self.require_mut(id)?.get_or_create_stratum(stratum)?;
        Ok(())
    }

    /// Writer handle for one stratum of one entry; creates the stratum.
    pub fn stratum_writer(
        &mut self,
        id: &str,
        stratum: impl Into<StratumId>,
    ) -> Result<StratumWriter<'_>, CatalogError> {
        let stratum = stratum.into();
        self.get_or_create_stratum(id, &stratum)?;
        Ok(StratumWriter::new(self, EntryId::from(id), stratum))
    }

    /// Collaborator write. Reference tombstones are rejected here; use
    /// [`remove_entry`](Self::remove_entry) to hide members.
    pub fn set_raw_value(
        &mut self,
        id: &str,
        stratum: &StratumId,
        attribute: &str,
        value: RawValue,
    ) -> Result<(), CatalogError> {
        self.set_raw_value_with(id, stratum, attribute, value, TombstonePolicy::Reject)
    }

    pub(crate) fn set_raw_value_with(
        &mut self,
        id: &str,
        stratum: &StratumId,
        attribute: &str,
        value: RawValue,
        tombstones: TombstonePolicy,
    ) -> Result<(), CatalogError> {
        let undo = self
            .require_mut(id)?
            .set_raw_value(stratum, attribute, value, tombstones)?;
        debug!(entry = id, stratum = %stratum, attribute, "Set raw value");
        self.guard_membership(id, attribute, |entry| entry.undo_write(undo))
    }

    pub fn clear_raw_value(
        &mut self,
        id: &str,
        stratum: &StratumId,
        attribute: &str,
    ) -> Result<(), CatalogError> {
        let undo = self.require_mut(id)?.clear_raw_value(stratum, attribute)?;
        self.guard_membership(id, attribute, |entry| entry.undo_write(undo))
    }

    /// Delete a whole stratum from an entry. Returns `false` if it did not exist.
    pub fn delete_stratum(&mut self, id: &str, stratum: &StratumId) -> Result<bool, CatalogError> {
        let removed = match self.require_mut(id)?.delete_stratum(stratum.as_str()) {
            Some(removed) => removed,
            None => return Ok(false),
        };
        let touched_members = removed.contains(MEMBERS);
        debug!(entry = id, stratum = %stratum, "Deleted stratum");
        if touched_members {
            let stratum = stratum.clone();
            self.guard_membership(id, MEMBERS, move |entry| {
                entry.restore_stratum(&stratum, removed)
            })?;
        }
        Ok(true)
    }

    /// Apply a staged stratum as one all-or-nothing write.
    pub fn commit_staged(&mut self, staged: StagedStratum) -> Result<(), CatalogError> {
        let StagedStratum {
            entry,
            stratum,
            values,
        } = staged;
        {
            let target = self.require(entry.as_str())?;
            for (attribute, value) in &values {
                target.check_write(&stratum, attribute, value, TombstonePolicy::Reject)?;
            }
        }

        let touched_members = values.contains_key(MEMBERS);
        let count = values.len();
        let target = self.require_mut(entry.as_str())?;
        if values.is_empty() {
            target.get_or_create_stratum(&stratum)?;
            return Ok(());
        }
        let mut undos: Vec<WriteUndo> = Vec::with_capacity(count);
        for (attribute, value) in values {
            match target.set_raw_value(&stratum, &attribute, value, TombstonePolicy::Reject) {
                Ok(undo) => undos.push(undo),
                Err(e) => {
                    for undo in undos.into_iter().rev() {
                        target.undo_write(undo);
                    }
                    return Err(e.into());
                }
            }
        }

        if touched_members {
            self.guard_membership(entry.as_str(), MEMBERS, move |target| {
                for undo in undos.into_iter().rev() {
                    target.undo_write(undo);
                }
            })?;
        }
        info!(entry = %entry, stratum = %stratum, attributes = count, "Committed staged stratum");
        Ok(())
    }

    /// After a write to `attribute` on `id`, reject it if it made membership cyclic.
    fn guard_membership<F>(
        &mut self,
        id: &str,
        attribute: &str,
        undo: F,
    ) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut CatalogEntry),
    {
        if attribute != MEMBERS {
            return Ok(());
        }
        let group = EntryId::from(id);
        if !self.require(id)?.is_group() {
            return Ok(());
        }
        if let Some(child) = self.cycle_through(&group) {
            warn!(group = %group, member = %child, "Rejected membership write: cycle");
            undo(self.require_mut(id)?);
            return Err(CatalogError::Cycle {
                parent: group,
                child,
            });
        }
        Ok(())
    }

    // ---- diagnostics ------------------------------------------------------

    pub(crate) fn record(&self, kind: DiagnosticKind) {
        self.diagnostics.borrow_mut().record(kind);
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().iter().cloned().collect()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().drain()
    }
}
