use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Expanded/collapsed flags keyed by delivery line id.
///
/// An id with no entry is collapsed. Entries for ids that have since left the
/// model are kept; they simply never match a rendered line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandState(BTreeMap<i64, bool>);

impl ExpandState {
    pub fn get(&self, id: i64) -> bool {
        self.0.get(&id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids currently expanded, ascending.
    pub fn expanded_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.0
            .iter()
            .filter(|(_, expanded)| **expanded)
            .map(|(id, _)| *id)
    }
}

/// Owner of the per-line expand flags for one tracker instance.
///
/// Only `toggle` mutates the state. Replacing the data model never touches it,
/// so rows a user opened stay open across refreshes.
#[derive(Debug, Clone, Default)]
pub struct ViewStateController {
    state: ExpandState,
}

impl ViewStateController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a previously exported state.
    pub fn from_state(state: ExpandState) -> Self {
        ViewStateController { state }
    }

    /// Flip the flag for `id` and return the new value.
    pub fn toggle(&mut self, id: i64) -> bool {
        let entry = self.state.0.entry(id).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.state.get(id)
    }

    pub fn expand_state(&self) -> &ExpandState {
        &self.state
    }

    pub fn into_state(self) -> ExpandState {
        self.state
    }
}
