//! Collision-free id assignment for a restore batch.

use std::collections::{BTreeMap, BTreeSet};

use sws_document::CandidateRecord;
use sws_model::{Registry, WindowId};

/// Where one candidate ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRemap {
    pub original: WindowId,
    pub assigned: WindowId,
}

impl IdRemap {
    pub fn is_remapped(&self) -> bool {
        self.original != self.assigned
    }
}

/// Pick an id for every candidate, in candidate order.
///
/// A candidate keeps its id unless a live window or an earlier candidate
/// already holds it. Fresh ids come from the registry's generator and skip
/// the original ids of candidates not planned yet, so a later candidate is
/// never pushed off an id it could have kept.
pub fn plan_id_remap(registry: &mut Registry, candidates: &[CandidateRecord]) -> Vec<IdRemap> {
    let mut taken: BTreeSet<WindowId> = registry.ids().collect();

    let mut pending: BTreeMap<WindowId, usize> = BTreeMap::new();
    for candidate in candidates {
        *pending.entry(candidate.id()).or_default() += 1;
    }
    // Always `taken` plus the ids still pending.
    let mut avoid: BTreeSet<WindowId> = taken.iter().chain(pending.keys()).copied().collect();

    let mut mapping = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let original = candidate.id();
        if let Some(count) = pending.get_mut(&original) {
            *count -= 1;
            if *count == 0 {
                pending.remove(&original);
                if !taken.contains(&original) {
                    avoid.remove(&original);
                }
            }
        }

        let assigned = if taken.contains(&original) {
            let fresh = registry.allocate_id_avoiding(&avoid);
            tracing::debug!(%original, %fresh, "id collision, remapping");
            fresh
        } else {
            original
        };

        taken.insert(assigned);
        avoid.insert(assigned);
        mapping.push(IdRemap { original, assigned });
    }
    mapping
}
