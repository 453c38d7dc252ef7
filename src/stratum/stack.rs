//! Stratum stack: an entry's strata kept in global order.

use crate::error::StratumError;
use crate::schema::{ComposedSchema, ValueKind};
use crate::stratum::{Stratum, StratumOrder};
use crate::types::{RawValue, StratumId};
use std::sync::Arc;

/// Whether a write may contain reference tombstones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TombstonePolicy {
    Reject,
    Allow,
}

#[derive(Debug, Clone)]
pub struct StratumStack {
    schema: Arc<ComposedSchema>,
    order: Arc<StratumOrder>,
    /// Lowest precedence first
    strata: Vec<(StratumId, Stratum)>,
}

impl StratumStack {
    pub fn new(schema: Arc<ComposedSchema>, order: Arc<StratumOrder>) -> Self {
        Self {
            schema,
            order,
            strata: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<ComposedSchema> {
        &self.schema
    }

    pub fn order(&self) -> &Arc<StratumOrder> {
        &self.order
    }

    pub fn get(&self, id: &str) -> Option<&Stratum> {
        self.position(id).map(|i| &self.strata[i].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn raw_value(&self, id: &str, attribute: &str) -> Option<&RawValue> {
        self.get(id).and_then(|s| s.get(attribute))
    }

    pub fn stratum_ids(&self) -> impl Iterator<Item = &StratumId> {
        self.strata.iter().map(|(id, _)| id)
    }

    /// Highest precedence first
    pub fn top_to_bottom(&self) -> impl Iterator<Item = (&StratumId, &Stratum)> {
        self.strata.iter().rev().map(|(id, s)| (id, s))
    }

    /// Lowest precedence first
    pub fn bottom_to_top(&self) -> impl Iterator<Item = (&StratumId, &Stratum)> {
        self.strata.iter().map(|(id, s)| (id, s))
    }

    pub fn len(&self) -> usize {
        self.strata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strata.is_empty()
    }

    /// Return the stratum, inserting an empty one at its global position if needed.
    /// The flag is `true` when the stratum was created by this call.
    pub fn get_or_create(&mut self, id: &StratumId) -> Result<(&mut Stratum, bool), StratumError> {
        if let Some(i) = self.position(id.as_str()) {
            return Ok((&mut self.strata[i].1, false));
        }
        let rank = self.order.require_rank(id)?;
        let insert_at = self
            .strata
            .iter()
            .position(|(existing, _)| self.order.rank(existing.as_str()).unwrap_or(0) > rank)
            .unwrap_or(self.strata.len());
        self.strata.insert(insert_at, (id.clone(), Stratum::new()));
        Ok((&mut self.strata[insert_at].1, true))
    }

    /// Validate a write against the composed schema without applying it.
    pub(crate) fn check_write(
        &self,
        id: &StratumId,
        attribute: &str,
        value: &RawValue,
        tombstones: TombstonePolicy,
    ) -> Result<(), StratumError> {
        self.order.require_rank(id)?;
        let descriptor =
            self.schema
                .describe(attribute)
                .map_err(|_| StratumError::SchemaMismatch {
                    attribute: attribute.to_string(),
                    kind: self.schema.kind().to_string(),
                })?;
        descriptor
            .kind
            .check(value)
            .map_err(|reason| StratumError::TypeMismatch {
                attribute: attribute.to_string(),
                expected: descriptor.kind.to_string(),
                reason,
            })?;
        if tombstones == TombstonePolicy::Reject
            && matches!(descriptor.kind, ValueKind::ArrayOfModelReference)
            && value
                .as_array()
                .map(|items| items.iter().any(|i| i.is_object()))
                .unwrap_or(false)
        {
            return Err(StratumError::TypeMismatch {
                attribute: attribute.to_string(),
                expected: descriptor.kind.to_string(),
                reason: "tombstones can only be written by removing an entry".to_string(),
            });
        }
        Ok(())
    }

    /// Set a raw value. Returns the previous raw value in that stratum and whether the
    /// stratum had to be created.
    pub(crate) fn set_raw_value(
        &mut self,
        id: &StratumId,
        attribute: &str,
        value: RawValue,
        tombstones: TombstonePolicy,
    ) -> Result<(Option<RawValue>, bool), StratumError> {
        self.check_write(id, attribute, &value, tombstones)?;
        let (stratum, created) = self.get_or_create(id)?;
        Ok((stratum.insert(attribute.to_string(), value), created))
    }

    /// Make an attribute absent in one stratum. Returns the removed raw value.
    pub fn clear_raw_value(
        &mut self,
        id: &StratumId,
        attribute: &str,
    ) -> Result<Option<RawValue>, StratumError> {
        self.order.require_rank(id)?;
        if !self.schema.contains(attribute) {
            return Err(StratumError::SchemaMismatch {
                attribute: attribute.to_string(),
                kind: self.schema.kind().to_string(),
            });
        }
        Ok(self
            .position(id.as_str())
            .and_then(|i| self.strata[i].1.remove(attribute)))
    }

    /// Put back a previous raw value (or absence) after a rejected write.
    pub(crate) fn restore_raw_value(
        &mut self,
        id: &StratumId,
        attribute: &str,
        previous: Option<RawValue>,
        created: bool,
    ) {
        if created {
            self.delete_stratum(id.as_str());
            return;
        }
        if let Some(i) = self.position(id.as_str()) {
            match previous {
                Some(value) => {
                    self.strata[i].1.insert(attribute.to_string(), value);
                }
                None => {
                    self.strata[i].1.remove(attribute);
                }
            }
        }
    }

    pub fn delete_stratum(&mut self, id: &str) -> Option<Stratum> {
        self.position(id).map(|i| self.strata.remove(i).1)
    }

    /// Reinsert a stratum removed by [`delete_stratum`](Self::delete_stratum).
    pub(crate) fn restore_stratum(&mut self, id: &StratumId, stratum: Stratum) {
        if let Ok((slot, _)) = self.get_or_create(id) {
            *slot = stratum;
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.strata.iter().position(|(existing, _)| existing.as_str() == id)
    }
}
