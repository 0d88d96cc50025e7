//! Canonical read-only view of the disc being processed
//!
//! [`DiscIndex`] is built once per run from the collaborator-supplied
//! [`DiscSnapshot`] and is immutable thereafter. It answers the two lookups
//! reconciliation needs: "which track sits at printed position N" and
//! "which codes does the server already have for that track".

use crate::error::{Error, Result};
use crate::types::{DiscSnapshot, TrackRef};
use crate::validators::Isrc;
use tracing::warn;

/// One indexed track: its reference plus the codes already on record
#[derive(Debug, Clone)]
struct IndexedTrack {
    track: TrackRef,
    known_isrcs: Vec<Isrc>,
}

/// Immutable per-run disc view
#[derive(Debug, Clone)]
pub struct DiscIndex {
    track_count: u32,
    tracks: Vec<IndexedTrack>,
}

impl DiscIndex {
    /// Build the index from a disc snapshot.
    ///
    /// Validates that the snapshot lists exactly `track_count` tracks with
    /// unique, contiguous positions `1..=track_count` in order. Known codes
    /// that fail ISRC validation are logged and dropped: a malformed server
    /// entry must not poison the whole run.
    ///
    /// # Errors
    /// [`Error::Snapshot`] when the track list does not match `track_count`
    /// or positions are out of order.
    pub fn from_snapshot(snapshot: &DiscSnapshot) -> Result<Self> {
        if snapshot.tracks.len() != snapshot.track_count as usize {
            return Err(Error::Snapshot(format!(
                "track_count is {} but snapshot lists {} tracks",
                snapshot.track_count,
                snapshot.tracks.len()
            )));
        }

        let mut tracks = Vec::with_capacity(snapshot.tracks.len());
        for (i, entry) in snapshot.tracks.iter().enumerate() {
            let expected = i as u32 + 1;
            if entry.position != expected {
                return Err(Error::Snapshot(format!(
                    "expected position {} at index {}, found {}",
                    expected, i, entry.position
                )));
            }

            let mut known_isrcs = Vec::with_capacity(entry.known_isrcs.len());
            for raw in &entry.known_isrcs {
                match Isrc::parse(raw) {
                    Ok(isrc) => known_isrcs.push(isrc),
                    Err(err) => {
                        warn!(
                            track = entry.position,
                            isrc = %raw,
                            "dropping malformed known ISRC from snapshot: {err}"
                        );
                    }
                }
            }

            tracks.push(IndexedTrack {
                track: TrackRef {
                    position: entry.position,
                    key: entry.key.clone(),
                    title: entry.title.clone(),
                    artist: entry.artist.clone(),
                },
                known_isrcs,
            });
        }

        Ok(Self {
            track_count: snapshot.track_count,
            tracks,
        })
    }

    /// Number of audio tracks on the disc
    pub fn track_count(&self) -> u32 {
        self.track_count
    }

    /// Track at the given 1-based position, or `None` outside `1..=track_count`
    pub fn track_at(&self, number: u32) -> Option<&TrackRef> {
        if number == 0 {
            return None;
        }
        self.tracks.get(number as usize - 1).map(|t| &t.track)
    }

    /// Codes the server already has for the track at the given position.
    ///
    /// Empty for positions outside the valid range.
    pub fn known_isrcs(&self, number: u32) -> &[Isrc] {
        if number == 0 {
            return &[];
        }
        self.tracks
            .get(number as usize - 1)
            .map(|t| t.known_isrcs.as_slice())
            .unwrap_or(&[])
    }

    /// All tracks in position order, each with its known codes
    pub fn tracks(&self) -> impl Iterator<Item = (&TrackRef, &[Isrc])> {
        self.tracks
            .iter()
            .map(|t| (&t.track, t.known_isrcs.as_slice()))
    }
}

// ============================================================================
// Tests
// ============================================================================
