//! Within-batch conflict detection
//!
//! A reading tool that reports the same code for two different tracks has
//! mis-attributed at least one of them. The whole batch from a single parse
//! run is scanned before reconciliation; every implicated code is flagged so
//! the planner can withhold it from submission. Detection never aborts the
//! run.

use crate::types::ParsedPair;
use crate::validators::Isrc;
use serde::Serialize;
use std::collections::HashMap;
use tracing::error;

/// One code the batch reported for more than one distinct track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchConflict {
    /// The mis-attributed code
    pub isrc: Isrc,
    /// Every track number the code was reported for, in first-seen order
    pub track_numbers: Vec<u32>,
}

/// Scan a parse batch for codes shared across distinct track numbers.
///
/// Codes that fail validation are skipped here; pass 1 of reconciliation
/// reports them. A code repeated for the *same* track number is not a
/// conflict. Conflicts come out in first-seen order, one per code.
pub fn detect_batch_conflicts(pairs: &[ParsedPair]) -> Vec<BatchConflict> {
    let mut order: Vec<Isrc> = Vec::new();
    let mut tracks_by_code: HashMap<Isrc, Vec<u32>> = HashMap::new();

    for pair in pairs {
        let Ok(isrc) = Isrc::parse(&pair.isrc) else {
            continue;
        };
        if !tracks_by_code.contains_key(&isrc) {
            order.push(isrc.clone());
        }
        let tracks = tracks_by_code.entry(isrc).or_default();
        if !tracks.contains(&pair.track_number) {
            tracks.push(pair.track_number);
        }
    }

    order
        .into_iter()
        .filter_map(|isrc| {
            let track_numbers = tracks_by_code.remove(&isrc).unwrap_or_default();
            if track_numbers.len() > 1 {
                let list = track_numbers
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                error!(isrc = %isrc, tracks = %list, "backend gave the same ISRC for multiple tracks");
                Some(BatchConflict {
                    isrc,
                    track_numbers,
                })
            } else {
                None
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_code_across_tracks_is_flagged() {
        let pairs = vec![
            ParsedPair::new(1, "USAAA0000001"),
            ParsedPair::new(2, "USAAA0000001"),
        ];
        let conflicts = detect_batch_conflicts(&pairs);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].isrc.as_str(), "USAAA0000001");
        assert_eq!(conflicts[0].track_numbers, vec![1, 2]);
    }

    #[test]
    fn distinct_codes_are_clean() {
        let pairs = vec![
            ParsedPair::new(1, "USAAA0000001"),
            ParsedPair::new(2, "USBBB0000002"),
        ];
        assert!(detect_batch_conflicts(&pairs).is_empty());
    }

    #[test]
    fn repeat_of_same_track_is_not_a_conflict() {
        // Some tools print each subchannel hit; re-reading the same track's
        // code is expected, not a mis-attribution.
        let pairs = vec![
            ParsedPair::new(1, "USAAA0000001"),
            ParsedPair::new(1, "US-AAA-00-00001"),
        ];
        assert!(detect_batch_conflicts(&pairs).is_empty());
    }

    #[test]
    fn comparison_is_on_normalized_codes() {
        let pairs = vec![
            ParsedPair::new(1, "US-AAA-00-00001"),
            ParsedPair::new(2, "USAAA0000001"),
        ];
        let conflicts = detect_batch_conflicts(&pairs);
        assert_eq!(conflicts.len(), 1, "separator variants are the same code");
    }

    #[test]
    fn invalid_codes_are_left_to_pass_one() {
        let pairs = vec![
            ParsedPair::new(1, "garbage"),
            ParsedPair::new(2, "garbage"),
        ];
        assert!(detect_batch_conflicts(&pairs).is_empty());
    }

    #[test]
    fn multiple_conflicts_in_first_seen_order() {
        let pairs = vec![
            ParsedPair::new(3, "USBBB0000002"),
            ParsedPair::new(1, "USAAA0000001"),
            ParsedPair::new(4, "USBBB0000002"),
            ParsedPair::new(2, "USAAA0000001"),
        ];
        let conflicts = detect_batch_conflicts(&pairs);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].isrc.as_str(), "USBBB0000002");
        assert_eq!(conflicts[0].track_numbers, vec![3, 4]);
        assert_eq!(conflicts[1].isrc.as_str(), "USAAA0000001");
        assert_eq!(conflicts[1].track_numbers, vec![1, 2]);
    }
}
