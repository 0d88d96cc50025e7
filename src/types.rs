//! Core data types shared across parsing and reconciliation
//!
//! Everything here is either an input shape supplied by a collaborator
//! (the disc snapshot fetched from the metadata service) or a small value
//! type flowing between the backend parsers and the reconciliation engine.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Where an ISRC/track association came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Parsed from this run's backend output
    OwnReading,
    /// Already attached to the track in the metadata snapshot
    PriorRecord,
}

/// One `(track number, code)` pair as printed by a backend tool.
///
/// The track number is the raw 1-based number from the tool's output, not
/// yet checked against the disc's actual track count, and `isrc` is the
/// matched code text before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPair {
    /// 1-based track number as printed
    pub track_number: u32,
    /// Raw matched code text (fragments concatenated, unvalidated)
    pub isrc: String,
}

impl ParsedPair {
    pub fn new(track_number: u32, isrc: impl Into<String>) -> Self {
        Self {
            track_number,
            isrc: isrc.into(),
        }
    }
}

/// Reference to one track of the disc being processed.
///
/// Equality and hashing are defined solely by `key`: the stable identifier
/// the metadata service uses to address the track for submission. Two
/// snapshots of the same track may differ in incidental fields (credit
/// phrasing, normalization); they still denote the same track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    /// 1-based position on the disc
    pub position: u32,
    /// Opaque stable identifier used for submission
    pub key: String,
    /// Track title, for reporting
    pub title: String,
    /// Track artist credit, when it differs from the release artist
    pub artist: Option<String>,
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TrackRef {}

impl Hash for TrackRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// The metadata service's current view of the disc, as handed to this crate.
///
/// Deserialized from the collaborator that talks to the service; this crate
/// never fetches it itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscSnapshot {
    /// Number of audio tracks on the disc
    pub track_count: u32,
    /// Tracks in position order
    pub tracks: Vec<TrackSnapshot>,
}

/// One track of the disc snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSnapshot {
    /// 1-based position on the disc
    pub position: u32,
    /// Stable identifier used for submission
    pub key: String,
    /// Track title
    pub title: String,
    /// Artist credit, when it differs from the release artist
    #[serde(default)]
    pub artist: Option<String>,
    /// Codes already attached to this track on the server
    #[serde(default)]
    pub known_isrcs: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
