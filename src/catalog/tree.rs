//! Hierarchy traversal over resolved group membership.

use super::{Catalog, DiagnosticKind};
use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use crate::schema::builtin::MEMBERS;
use crate::schema::ValueKind;
use crate::types::EntryId;
use std::collections::HashSet;
use tracing::warn;

impl Catalog {
    /// Resolved member ids of a group; empty for items and unknown ids.
    pub(crate) fn member_ids(&self, id: &str) -> Vec<EntryId> {
        match self.entries.get(id) {
            Some(entry) if entry.is_group() => entry
                .resolve(MEMBERS)
                .map(|r| r.references())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Entries a group's resolved membership points at, in resolved order. Ids with no
    /// registered entry are skipped and recorded as diagnostics.
    pub fn resolve_children(&self, id: &str) -> Result<Vec<&CatalogEntry>, CatalogError> {
        let group = self.require(id)?;
        if !group.is_group() {
            return Err(CatalogError::NotAGroup(group.id().clone()));
        }
        let mut children = Vec::new();
        for member in self.member_ids(id) {
            match self.entries.get(member.as_str()) {
                Some(child) => children.push(child),
                None => {
                    warn!(group = id, missing = %member, "Group references unknown entry");
                    self.record(DiagnosticKind::UnknownReference {
                        entry: group.id().clone(),
                        attribute: MEMBERS.to_string(),
                        missing: member,
                    });
                }
            }
        }
        Ok(children)
    }

    /// Resolve every reference-valued attribute of every entry and record a diagnostic
    /// for each id with no registered entry. Returns the number of missing references.
    pub fn check_references(&self) -> usize {
        let mut missing = 0;
        for entry in self.entries.values() {
            for descriptor in entry.schema().descriptors() {
                if !matches!(
                    descriptor.kind,
                    ValueKind::ModelReference | ValueKind::ArrayOfModelReference
                ) {
                    continue;
                }
                let ids = entry
                    .resolve(&descriptor.name)
                    .map(|r| r.references())
                    .unwrap_or_default();
                for id in ids {
                    if !self.entries.contains_key(id.as_str()) {
                        missing += 1;
                        self.record(DiagnosticKind::UnknownReference {
                            entry: entry.id().clone(),
                            attribute: descriptor.name.clone(),
                            missing: id,
                        });
                    }
                }
            }
        }
        missing
    }

    /// Groups whose resolved membership currently contains `id`.
    pub fn parents_of(&self, id: &EntryId) -> Vec<EntryId> {
        self.entries
            .values()
            .filter(|entry| entry.is_group())
            .filter(|group| self.member_ids(group.id().as_str()).contains(id))
            .map(|group| group.id().clone())
            .collect()
    }

    /// Entries that are not a member of any group, in insertion order.
    pub fn roots(&self) -> Vec<&CatalogEntry> {
        let mut contained = HashSet::new();
        for group in self.entries.values().filter(|e| e.is_group()) {
            contained.extend(self.member_ids(group.id().as_str()));
        }
        self.entries
            .values()
            .filter(|entry| !contained.contains(entry.id()))
            .collect()
    }

    /// Lazy depth-first walk of the hierarchy below `root`, root included.
    pub fn walk(&self, root: &str) -> Result<CatalogWalk<'_>, CatalogError> {
        let entry = self.require(root)?;
        Ok(CatalogWalk {
            catalog: self,
            stack: vec![(0, entry)],
        })
    }

    /// True if `target` is reachable from `start` through resolved membership,
    /// `start` itself included.
    fn reaches(&self, start: &EntryId, target: &EntryId) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![start.clone()];
        while let Some(current) = pending.pop() {
            if current == *target {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            pending.extend(self.member_ids(current.as_str()));
        }
        false
    }

    /// Whether making `child` a member of `parent` would close a membership cycle.
    pub fn would_create_cycle(&self, parent: &EntryId, child: &EntryId) -> bool {
        self.reaches(child, parent)
    }

    /// First member of `group` from which `group` is reachable again, if any.
    pub(crate) fn cycle_through(&self, group: &EntryId) -> Option<EntryId> {
        self.member_ids(group.as_str())
            .into_iter()
            .find(|member| self.reaches(member, group))
    }
}

/// Depth-first iterator returned by [`Catalog::walk`]. Yields `(depth, entry)`.
///
/// Children are expanded only when their parent is yielded, so reading part of the
/// tree only resolves membership for the groups visited.
pub struct CatalogWalk<'a> {
    catalog: &'a Catalog,
    stack: Vec<(usize, &'a CatalogEntry)>,
}

impl<'a> Iterator for CatalogWalk<'a> {
    type Item = (usize, &'a CatalogEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, entry) = self.stack.pop()?;
        if entry.is_group() {
            if let Ok(children) = self.catalog.resolve_children(entry.id().as_str()) {
                self.stack
                    .extend(children.into_iter().rev().map(|child| (depth + 1, child)));
            }
        }
        Some((depth, entry))
    }
}
