//! Global stratum ordering.
//!
//! One total order over stratum ids is built at startup and shared read-only by
//! every entry. Lowest precedence first:
//!
//! `defaults < definition < load [< registered load strata] < underride < user < override`

use crate::error::StratumError;
use crate::types::StratumId;
use std::collections::HashMap;
use tracing::warn;

/// Well-known stratum ids
pub mod common_strata {
    /// Hard-coded defaults supplied by the application
    pub const DEFAULTS: &str = "defaults";
    /// Catalog document definitions
    pub const DEFINITION: &str = "definition";
    /// Values populated from a remote document after load
    pub const LOAD: &str = "load";
    /// User-level defaults that sit under interactive edits
    pub const UNDERRIDE: &str = "underride";
    /// Interactive user edits
    pub const USER: &str = "user";
    /// Forced values that beat everything else
    pub const OVERRIDE: &str = "override";
}

#[derive(Debug, Clone)]
pub struct StratumOrder {
    bottom_to_top: Vec<StratumId>,
    ranks: HashMap<StratumId, usize>,
}

impl Default for StratumOrder {
    fn default() -> Self {
        StratumOrder::builder().build()
    }
}

impl StratumOrder {
    pub fn builder() -> StratumOrderBuilder {
        StratumOrderBuilder::default()
    }

    /// Position in the order; higher rank means higher precedence.
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    pub fn require_rank(&self, id: &StratumId) -> Result<usize, StratumError> {
        self.rank(id.as_str())
            .ok_or_else(|| StratumError::UnknownStratum(id.clone()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ranks.contains_key(id)
    }

    pub fn bottom_to_top(&self) -> &[StratumId] {
        &self.bottom_to_top
    }

    pub fn top_to_bottom(&self) -> impl Iterator<Item = &StratumId> {
        self.bottom_to_top.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.bottom_to_top.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bottom_to_top.is_empty()
    }
}

/// Collects extra load strata before the order is frozen.
#[derive(Debug, Default, Clone)]
pub struct StratumOrderBuilder {
    load_strata: Vec<StratumId>,
}

impl StratumOrderBuilder {
    /// Add a named load stratum. Load strata sit above `load` in registration order.
    pub fn with_load_stratum(mut self, id: impl Into<StratumId>) -> Self {
        self.load_strata.push(id.into());
        self
    }

    pub fn build(self) -> StratumOrder {
        use common_strata::*;

        let mut bottom_to_top: Vec<StratumId> = vec![
            DEFAULTS.into(),
            DEFINITION.into(),
            LOAD.into(),
        ];
        for id in self.load_strata {
            if bottom_to_top.contains(&id)
                || [UNDERRIDE, USER, OVERRIDE].contains(&id.as_str())
            {
                warn!(stratum = %id, "Ignoring duplicate load stratum");
                continue;
            }
            bottom_to_top.push(id);
        }
        for id in [UNDERRIDE, USER, OVERRIDE] {
            bottom_to_top.push(StratumId::from(id));
        }

        let ranks = bottom_to_top
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        StratumOrder {
            bottom_to_top,
            ranks,
        }
    }
}
