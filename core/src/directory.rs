//! The save directory: the aggregate object both records persist.
//!
//! One directory holds every entity's save fragment plus the cross-cutting
//! scalars that belong to no single entity (the day counter). Fragment
//! lists grow in discovery order and are never pruned; a scene that
//! instantiates fewer entities than fragments exist leaves the surplus
//! untouched.

use crate::saveable::Saveable;
use crate::types::{Day, KindName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema stamp written into every record. A decoded directory carrying a
/// different stamp is treated like a decode failure.
pub const SAVE_VERSION: u32 = 1;

/// One entity instance's saved state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Gameplay fields, opaque to the sync engine.
    pub payload: serde_json::Value,
    /// "Days since last data" counter, for kinds that track one.
    pub days_since_data: Option<u32>,
}

/// The aggregate persisted to each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDirectory {
    pub version: u32,
    /// Cross-cutting day counter. Process-wide, outside any fragment.
    pub day: Day,
    /// When a scene save last produced this directory.
    pub saved_at: Option<DateTime<Utc>>,
    /// Kind name to fragments in discovery order. BTreeMap keeps the
    /// encoded bytes stable across runs.
    fragments: BTreeMap<KindName, Vec<Fragment>>,
}

impl Default for SaveDirectory {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            day: 0,
            saved_at: None,
            fragments: BTreeMap::new(),
        }
    }
}

impl SaveDirectory {
    /// Populate one empty fragment slot per recognized kind.
    ///
    /// Called once on a freshly constructed directory, before its first
    /// save or load pass. `save_all` stays tolerant of a missing slot, so
    /// skipping this only costs the guarantee that every recognized kind
    /// appears in the record from day one.
    pub fn set_initial_references(&mut self, kinds: &[KindName]) {
        for kind in kinds {
            self.fragments
                .entry(kind.clone())
                .or_insert_with(|| vec![Fragment::default()]);
        }
    }

    /// Fold one live entity's current fields into the directory.
    ///
    /// The fragment index is the entity's discovery order within the pass,
    /// tracked by `cursor`: existing fragments are overwritten in place,
    /// an index past the end appends. Lists only grow.
    pub fn save_all(&mut self, entity: &dyn Saveable, cursor: &mut PassCursor) {
        let kind = entity.kind();
        let index = cursor.next(kind);
        let fragment = entity.write_fragment();
        let list = self.fragments.entry(kind.to_string()).or_default();
        if index < list.len() {
            list[index] = fragment;
        } else {
            list.push(fragment);
        }
    }

    /// Copy the matching fragment back into a live entity.
    ///
    /// An entity with no matching fragment keeps its constructed defaults;
    /// that is not an error.
    pub fn load_all(&self, entity: &mut dyn Saveable, cursor: &mut PassCursor) {
        let kind = entity.kind();
        let index = cursor.next(kind);
        if let Some(fragment) = self.fragments.get(kind).and_then(|list| list.get(index)) {
            entity.read_fragment(fragment);
        }
    }

    /// Advance the day counter and every fragment's days-since counter in
    /// one cross-cutting pass. Fragments that do not track a counter are
    /// untouched.
    pub fn increment_all_day_since_data(&mut self) {
        self.day += 1;
        for list in self.fragments.values_mut() {
            for fragment in list {
                if let Some(days) = fragment.days_since_data.as_mut() {
                    *days += 1;
                }
            }
        }
    }

    /// Fragments recorded for `kind`, in discovery order.
    pub fn fragments(&self, kind: &str) -> &[Fragment] {
        self.fragments.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kind names with at least one fragment slot.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }
}

/// Tracks per-kind discovery-order indices across one save or load pass.
///
/// Every pass starts a fresh cursor; reusing one across passes would
/// mis-align instances with their fragments.
#[derive(Debug, Default)]
pub struct PassCursor {
    next_index: BTreeMap<KindName, usize>,
}

impl PassCursor {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, kind: &str) -> usize {
        let slot = self.next_index.entry(kind.to_string()).or_insert(0);
        let index = *slot;
        *slot += 1;
        index
    }
}
