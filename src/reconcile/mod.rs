//! Reconciliation of parsed codes against the disc's recorded metadata
//!
//! Joins one parse batch with the [`DiscIndex`] in two passes:
//!
//! - **Pass 1 (own reading → candidates):** each `(track number, code)` pair
//!   is range-checked, validated, registered, and classified: a new
//!   submission candidate, a no-op ("already attached"), or an error
//!   (unknown track, invalid code).
//! - **Pass 2 (full cross-check):** for *every* track on the disc, the codes
//!   the server already has are registered as `PriorRecord`, but only codes
//!   this run actually found, so the registry stays bounded to relevant
//!   entries.
//!
//! Duplicate groups are then derived from the registry: any code attached to
//! more than one track, whatever the origin mix. Nothing here is fatal; the
//! engine always produces a best-effort [`ReconcileReport`] and leaves the
//! proceed/abort decision to the caller.

pub mod conflicts;
pub mod planner;
pub mod registry;

pub use conflicts::{detect_batch_conflicts, BatchConflict};
pub use planner::{plan_submission, SubmissionPlan};
pub use registry::{Association, DuplicateGroup, IsrcRegistry};

use crate::disc::DiscIndex;
use crate::types::{Origin, ParsedPair, TrackRef};
use crate::validators::Isrc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// One track/code assignment, resolved against the disc index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackAssignment {
    /// The resolved track
    pub track: TrackRef,
    /// The validated, normalized code
    pub isrc: Isrc,
}

/// Everything one reconciliation run produced
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// New assignments worth submitting, before conflict exclusion
    pub candidates: Vec<TrackAssignment>,
    /// Codes the server already had on the same track (no-ops)
    pub already_attached: Vec<TrackAssignment>,
    /// Codes the batch reported for more than one track
    pub batch_conflicts: Vec<BatchConflict>,
    /// Codes attached to more than one track, any origin mix
    pub duplicates: Vec<DuplicateGroup>,
    /// Unknown-track + invalid-format + within-batch-conflict events
    pub error_count: u32,
}

impl ReconcileReport {
    /// Whether anything at all went wrong during reconciliation
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Two-pass reconciliation over one parse batch
#[derive(Debug)]
pub struct ReconciliationEngine<'a> {
    index: &'a DiscIndex,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(index: &'a DiscIndex) -> Self {
        Self { index }
    }

    /// Classify every parsed pair and cross-check against recorded codes
    pub fn reconcile(&self, pairs: &[ParsedPair]) -> ReconcileReport {
        let batch_conflicts = detect_batch_conflicts(pairs);
        let mut error_count = batch_conflicts.len() as u32;

        let mut registry = IsrcRegistry::new();
        let mut candidates = Vec::new();
        let mut already_attached = Vec::new();

        // Pass 1: own readings
        for pair in pairs {
            let Some(track) = self.index.track_at(pair.track_number) else {
                error!(
                    isrc = %pair.isrc,
                    track = pair.track_number,
                    "ISRC found for unknown track"
                );
                error_count += 1;
                continue;
            };
            let isrc = match Isrc::parse(&pair.isrc) {
                Ok(isrc) => isrc,
                Err(err) => {
                    warn!(
                        isrc = %pair.isrc,
                        track = pair.track_number,
                        "dropping invalid ISRC: {err}"
                    );
                    error_count += 1;
                    continue;
                }
            };

            // The observed attachment always enters the registry: even a
            // no-op participates in duplicate detection when another track
            // carries the same code.
            registry.insert(
                isrc.clone(),
                Association {
                    track: track.clone(),
                    origin: Origin::OwnReading,
                },
            );

            let assignment = TrackAssignment {
                track: track.clone(),
                isrc: isrc.clone(),
            };
            if self.index.known_isrcs(pair.track_number).contains(&isrc) {
                debug!(
                    isrc = %isrc,
                    track = pair.track_number,
                    "ISRC already attached to track"
                );
                already_attached.push(assignment);
            } else {
                info!(
                    isrc = %isrc,
                    track = pair.track_number,
                    "found new ISRC for track"
                );
                candidates.push(assignment);
            }
        }

        // Pass 2: recorded codes, restricted to codes this run found
        for (track, known) in self.index.tracks() {
            for isrc in known {
                if registry.contains(isrc) {
                    registry.insert(
                        isrc.clone(),
                        Association {
                            track: track.clone(),
                            origin: Origin::PriorRecord,
                        },
                    );
                }
            }
        }

        let duplicates = registry.duplicate_groups();
        if !duplicates.is_empty() {
            info!(
                count = duplicates.len(),
                "ISRCs attached to multiple tracks on this release"
            );
        }

        ReconcileReport {
            candidates,
            already_attached,
            batch_conflicts,
            duplicates,
            error_count,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
