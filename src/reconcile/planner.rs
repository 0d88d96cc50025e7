//! Submission planning
//!
//! Turns a [`ReconcileReport`] into the final track-key → code map for the
//! external submission collaborator. The safety rule is conservative: a code
//! implicated in *any* conflict (reported for two tracks in one batch, or
//! already attached to a different track on the server) is withheld from
//! submission entirely and left to the duplicate report for manual cleanup.
//! A pre-existing attachment elsewhere is evidence of a catalog problem, not
//! grounds to add a second attachment.

use crate::reconcile::ReconcileReport;
use crate::validators::Isrc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use tracing::info;

/// Final conflict-free submission map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionPlan {
    /// Track key → code, ready for the submission API
    pub entries: BTreeMap<String, Isrc>,
}

impl SubmissionPlan {
    /// Number of assignments to submit
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there is nothing worth submitting
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the submission map from pass-1 candidates, excluding every code
/// implicated in a within-batch conflict or a duplicate group.
pub fn plan_submission(report: &ReconcileReport) -> SubmissionPlan {
    let withheld: HashSet<&Isrc> = report
        .batch_conflicts
        .iter()
        .map(|conflict| &conflict.isrc)
        .chain(report.duplicates.iter().map(|group| &group.isrc))
        .collect();

    let mut entries = BTreeMap::new();
    for candidate in &report.candidates {
        if withheld.contains(&candidate.isrc) {
            info!(
                isrc = %candidate.isrc,
                track = candidate.track.position,
                "withholding conflicted ISRC from submission"
            );
            continue;
        }
        entries.insert(candidate.track.key.clone(), candidate.isrc.clone());
    }

    SubmissionPlan { entries }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::DiscIndex;
    use crate::reconcile::ReconciliationEngine;
    use crate::types::{DiscSnapshot, ParsedPair, TrackSnapshot};

    fn index(known_per_track: &[&[&str]]) -> DiscIndex {
        let tracks = known_per_track
            .iter()
            .enumerate()
            .map(|(i, known)| TrackSnapshot {
                position: i as u32 + 1,
                key: format!("rec-{}", i + 1),
                title: format!("Track {}", i + 1),
                artist: None,
                known_isrcs: known.iter().map(|s| s.to_string()).collect(),
            })
            .collect::<Vec<_>>();
        DiscIndex::from_snapshot(&DiscSnapshot {
            track_count: tracks.len() as u32,
            tracks,
        })
        .unwrap()
    }

    fn plan(index: &DiscIndex, pairs: &[ParsedPair]) -> SubmissionPlan {
        let report = ReconciliationEngine::new(index).reconcile(pairs);
        plan_submission(&report)
    }

    #[test]
    fn clean_candidates_all_submit() {
        let index = index(&[&[], &[]]);
        let plan = plan(
            &index,
            &[
                ParsedPair::new(1, "USAAA0000001"),
                ParsedPair::new(2, "USBBB0000002"),
            ],
        );

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.entries["rec-1"].as_str(), "USAAA0000001");
        assert_eq!(plan.entries["rec-2"].as_str(), "USBBB0000002");
    }

    #[test]
    fn batch_conflict_withholds_every_implicated_track() {
        let index = index(&[&[], &[], &[]]);
        let plan = plan(
            &index,
            &[
                ParsedPair::new(1, "USAAA0000001"),
                ParsedPair::new(2, "USAAA0000001"),
                ParsedPair::new(3, "USCCC0000003"),
            ],
        );

        assert_eq!(plan.len(), 1, "only the unconflicted code submits");
        assert!(!plan.entries.contains_key("rec-1"));
        assert!(!plan.entries.contains_key("rec-2"));
        assert_eq!(plan.entries["rec-3"].as_str(), "USCCC0000003");
    }

    #[test]
    fn prior_record_on_other_track_withholds_candidate() {
        // The server already has this code on track 2; attaching it to
        // track 1 as well would compound the catalog problem.
        let index = index(&[&[], &["USAAA0000001"]]);
        let plan = plan(&index, &[ParsedPair::new(1, "USAAA0000001")]);

        assert!(plan.is_empty(), "cross-record duplicate is withheld");
    }

    #[test]
    fn unrelated_codes_still_submit_alongside_a_conflict() {
        let index = index(&[&[], &["USAAA0000001"], &[]]);
        let plan = plan(
            &index,
            &[
                ParsedPair::new(1, "USAAA0000001"),
                ParsedPair::new(3, "USCCC0000003"),
            ],
        );

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.entries["rec-3"].as_str(), "USCCC0000003");
    }

    #[test]
    fn already_attached_codes_are_not_resubmitted() {
        let index = index(&[&["USAAA0000001"]]);
        let plan = plan(&index, &[ParsedPair::new(1, "USAAA0000001")]);
        assert!(plan.is_empty(), "no-op readings produce no entries");
    }
}
