//! # isrcsubmit-core
//!
//! Extracts per-track ISRCs from the text output of disc-reading tools and
//! reconciles them against the identifiers a metadata service already has
//! on record, producing a conflict-free submission plan plus a duplicate
//! report for everything ambiguous.
//!
//! Data flows one way:
//!
//! ```text
//! raw stream ──> backends::gather ──> (track, code) pairs
//!                                        │
//!              DiscIndex (snapshot) ──> ReconciliationEngine
//!                                        │
//!                              ReconcileReport ──> plan_submission
//! ```
//!
//! Process spawning, network access, and user interaction are collaborator
//! responsibilities; this crate consumes a line stream (or a sidecar TOC
//! file path) and a disc snapshot, and returns plain values. No error here
//! is fatal to a run: parsing and reconciliation always finish with a
//! best-effort result and an error count for the caller to judge.
//!
//! # Example
//! ```rust,ignore
//! use isrcsubmit_core::{
//!     gather, plan_submission, Backend, BackendSource, DiscIndex,
//!     ReconciliationEngine, SessionContext,
//! };
//!
//! let ctx = SessionContext::new(Backend::Discisrc);
//! let scan = gather(&ctx, BackendSource::Stream(reader))?;
//! let index = DiscIndex::from_snapshot(&snapshot)?;
//! let report = ReconciliationEngine::new(&index).reconcile(&scan.pairs);
//! let plan = plan_submission(&report);
//! submit(plan.entries)?; // external collaborator
//! ```

pub mod backends;
pub mod config;
pub mod disc;
pub mod error;
pub mod reconcile;
pub mod types;
pub mod validators;

pub use backends::{gather, parse_stream, Backend, BackendSource, ScanOutput};
pub use config::SessionContext;
pub use disc::DiscIndex;
pub use error::{Error, Result};
pub use reconcile::{
    detect_batch_conflicts, plan_submission, Association, BatchConflict, DuplicateGroup,
    ReconcileReport, ReconciliationEngine, SubmissionPlan, TrackAssignment,
};
pub use types::{DiscSnapshot, Origin, ParsedPair, TrackRef, TrackSnapshot};
pub use validators::{Isrc, IsrcFormatError};
