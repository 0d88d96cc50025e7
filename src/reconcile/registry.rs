//! ISRC registry: code → track associations
//!
//! Accumulates every association observed during one run, first the
//! `OwnReading` pairs as parsing completes, then the `PriorRecord` codes the
//! server already had, and answers "which tracks share this code".
//! Insertion order is preserved for both codes and members so reports are
//! stable across runs. The registry is mutated only by the reconciliation
//! engine and is discarded at the end of the run.

use crate::types::{Origin, TrackRef};
use crate::validators::Isrc;
use serde::Serialize;
use std::collections::HashMap;

/// One observed attachment of a code to a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    /// The track the code was seen on
    pub track: TrackRef,
    /// Whether this run read it or the server already had it
    pub origin: Origin,
}

/// A code attached to more than one track, with every member association
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// The shared code
    pub isrc: Isrc,
    /// All member associations, in insertion order
    pub members: Vec<Association>,
}

/// Code → ordered association set, insertion order preserved
#[derive(Debug, Default)]
pub struct IsrcRegistry {
    /// Codes in first-seen order
    order: Vec<Isrc>,
    entries: HashMap<Isrc, Vec<Association>>,
}

impl IsrcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an association.
    ///
    /// A second association for the same track under the same code is
    /// ignored: the first observation wins, so an `OwnReading` entry is not
    /// shadowed by the server's `PriorRecord` copy of the same attachment.
    pub fn insert(&mut self, isrc: Isrc, association: Association) {
        if !self.entries.contains_key(&isrc) {
            self.order.push(isrc.clone());
        }
        let members = self.entries.entry(isrc).or_default();
        if members.iter().all(|m| m.track != association.track) {
            members.push(association);
        }
    }

    /// Whether any association was recorded for this code
    pub fn contains(&self, isrc: &Isrc) -> bool {
        self.entries.contains_key(isrc)
    }

    /// Associations recorded for this code, in insertion order
    pub fn associations(&self, isrc: &Isrc) -> &[Association] {
        self.entries.get(isrc).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct codes recorded
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every code attached to more than one track, in first-seen order
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        self.order
            .iter()
            .filter_map(|isrc| {
                let members = &self.entries[isrc];
                (members.len() > 1).then(|| DuplicateGroup {
                    isrc: isrc.clone(),
                    members: members.clone(),
                })
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn track(position: u32, key: &str) -> TrackRef {
        TrackRef {
            position,
            key: key.to_string(),
            title: format!("Track {position}"),
            artist: None,
        }
    }

    fn isrc(raw: &str) -> Isrc {
        Isrc::parse(raw).unwrap()
    }

    #[test]
    fn same_track_is_recorded_once() {
        let mut registry = IsrcRegistry::new();
        registry.insert(
            isrc("USS1Z9900001"),
            Association {
                track: track(1, "rec-1"),
                origin: Origin::OwnReading,
            },
        );
        // The server's copy of the same attachment must not create a group.
        registry.insert(
            isrc("USS1Z9900001"),
            Association {
                track: track(1, "rec-1"),
                origin: Origin::PriorRecord,
            },
        );

        let members = registry.associations(&isrc("USS1Z9900001"));
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].origin, Origin::OwnReading, "first wins");
        assert!(registry.duplicate_groups().is_empty());
    }

    #[test]
    fn distinct_tracks_form_a_duplicate_group() {
        let mut registry = IsrcRegistry::new();
        registry.insert(
            isrc("USS1Z9900001"),
            Association {
                track: track(1, "rec-1"),
                origin: Origin::OwnReading,
            },
        );
        registry.insert(
            isrc("USS1Z9900001"),
            Association {
                track: track(2, "rec-2"),
                origin: Origin::PriorRecord,
            },
        );

        let groups = registry.duplicate_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].isrc.as_str(), "USS1Z9900001");
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].members[0].track.position, 1);
        assert_eq!(groups[0].members[1].track.position, 2);
    }

    #[test]
    fn groups_come_out_in_first_seen_order() {
        let mut registry = IsrcRegistry::new();
        for (code, position) in [
            ("USS1Z9900003", 3),
            ("USS1Z9900001", 1),
            ("USS1Z9900002", 2),
        ] {
            registry.insert(
                isrc(code),
                Association {
                    track: track(position, &format!("rec-{position}")),
                    origin: Origin::OwnReading,
                },
            );
            registry.insert(
                isrc(code),
                Association {
                    track: track(position + 10, &format!("rec-{}", position + 10)),
                    origin: Origin::PriorRecord,
                },
            );
        }

        let groups = registry.duplicate_groups();
        let codes: Vec<&str> = groups.iter().map(|g| g.isrc.as_str()).collect();
        assert_eq!(codes, vec!["USS1Z9900003", "USS1Z9900001", "USS1Z9900002"]);
    }

    #[test]
    fn lookups_on_unknown_codes_are_empty() {
        let registry = IsrcRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains(&isrc("USS1Z9900001")));
        assert!(registry.associations(&isrc("USS1Z9900001")).is_empty());
    }
}
