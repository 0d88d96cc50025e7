//! Backend output grammars and the stream parser
//!
//! Every supported disc-reading tool prints per-track ISRCs in its own
//! line-oriented format. Each format is described by one [`Grammar`] entry:
//! a fast-reject line prefix, a capture pattern for the track number and the
//! four code fragments (country, registrant, year, designation), and the
//! tool's quirks. Adding a backend means adding a table entry, never
//! branching deeper in the shared scan loop.
//!
//! # Backends
//! | id           | grammar                                        |
//! |--------------|------------------------------------------------|
//! | `mediatools` | `ISRC N CC-XXX-DD-DDDDD` (rejects `ISRCS` rows) |
//! | `discisrc`   | `Track N : CC-XXX-DD-DDDDD`                     |
//! | `cdrdao`     | sidecar TOC file, see [`sidecar`]               |
//! | `cd-info`    | `TRACK N ISRC: CC-XXX-DD-DDDDD`                 |
//! | `cdda2wav`   | `T: N ISRC: CC-XXX-DD-DDDDD`                    |
//! | `icedax`     | same tool family as `cdda2wav`, same grammar    |
//! | `drutil`     | `Track N ISRC: ...` with `block` in the line    |
//!
//! # Error handling
//! A line that fails the prefix filter is ignored silently. A line that
//! passes the filter but not the pattern is a soft warning: logged, counted
//! in [`ScanOutput::warnings`], skipped. A mid-stream read error ends the
//! scan without discarding the pairs parsed so far.

pub mod sidecar;

use crate::config::SessionContext;
use crate::error::{Error, Result};
use crate::types::ParsedPair;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// The four ISRC fragments with optional hyphen separators
const ISRC_FRAGMENTS: &str = "([A-Z]{2})-?([A-Z0-9]{3})-?([0-9]{2})-?([0-9]{5})";

static DISCISRC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"Track\s+([0-9]+)\s+:\s+{ISRC_FRAGMENTS}")).expect("valid regex")
});

static CDDA2WAV_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"T:\s+([0-9]+)\sISRC:\s+{ISRC_FRAGMENTS}")).expect("valid regex")
});

static CD_INFO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"TRACK\s+([0-9]+)\sISRC:\s+{ISRC_FRAGMENTS}")).expect("valid regex")
});

static MEDIATOOLS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"ISRC\s+([0-9]+)\s+{ISRC_FRAGMENTS}")).expect("valid regex")
});

static DRUTIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"Track\s+([0-9]+)\sISRC:\s+{ISRC_FRAGMENTS}")).expect("valid regex")
});

/// Recognized backend identifiers, in extraction priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Windows `mediatools`/`media_info` tool
    Mediatools,
    /// `discisrc` from libdiscid
    Discisrc,
    /// `cdrdao`, which writes a TOC sidecar file instead of streaming
    Cdrdao,
    /// `cd-info` from libcdio
    #[serde(rename = "cd-info")]
    CdInfo,
    /// `cdda2wav` from cdrtools
    Cdda2wav,
    /// `icedax` from cdrkit, a fork of cdda2wav
    Icedax,
    /// `drutil`, included in Mac OS X
    Drutil,
}

impl Backend {
    /// All backends, highest extraction priority first
    pub const ALL: [Backend; 7] = [
        Backend::Mediatools,
        Backend::Discisrc,
        Backend::Cdrdao,
        Backend::CdInfo,
        Backend::Cdda2wav,
        Backend::Icedax,
        Backend::Drutil,
    ];

    /// Canonical identifier string
    pub fn id(self) -> &'static str {
        match self {
            Backend::Mediatools => "mediatools",
            Backend::Discisrc => "discisrc",
            Backend::Cdrdao => "cdrdao",
            Backend::CdInfo => "cd-info",
            Backend::Cdda2wav => "cdda2wav",
            Backend::Icedax => "icedax",
            Backend::Drutil => "drutil",
        }
    }

    /// Whether this backend writes a TOC sidecar file instead of streaming
    pub fn uses_sidecar(self) -> bool {
        matches!(self, Backend::Cdrdao)
    }

    /// Grammar table entry, `None` for the sidecar backend
    fn grammar(self) -> Option<&'static Grammar> {
        match self {
            Backend::Discisrc => Some(&DISCISRC_GRAMMAR),
            // icedax is a fork of the cdda2wav tool; identical output grammar
            Backend::Cdda2wav | Backend::Icedax => Some(&CDDA2WAV_GRAMMAR),
            Backend::CdInfo => Some(&CD_INFO_GRAMMAR),
            Backend::Mediatools => Some(&MEDIATOOLS_GRAMMAR),
            Backend::Drutil => Some(&DRUTIL_GRAMMAR),
            Backend::Cdrdao => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mediatools" => Ok(Backend::Mediatools),
            // preview build of mediatools, same output grammar
            "media_info" => Ok(Backend::Mediatools),
            "discisrc" => Ok(Backend::Discisrc),
            "cdrdao" => Ok(Backend::Cdrdao),
            "cd-info" => Ok(Backend::CdInfo),
            "cdda2wav" => Ok(Backend::Cdda2wav),
            "icedax" => Ok(Backend::Icedax),
            "drutil" => Ok(Backend::Drutil),
            other => Err(Error::UnknownBackend(other.to_string())),
        }
    }
}

/// One backend's line grammar
struct Grammar {
    /// Fast-reject: a line must start with this to be considered
    prefix: &'static str,
    /// Reject lines starting with this even when `prefix` matches
    exclude_prefix: Option<&'static str>,
    /// Substring that must appear somewhere in the line
    needle: Option<&'static str>,
    /// Minimum raw line length to be considered
    min_len: usize,
    /// Captures: track number, then the four ISRC fragments
    pattern: &'static Lazy<Regex>,
    /// Split raw lines on embedded carriage returns before filtering
    split_cr: bool,
}

static DISCISRC_GRAMMAR: Grammar = Grammar {
    prefix: "Track",
    exclude_prefix: None,
    needle: None,
    // discisrc prints bare "Track N" rows for tracks without a code;
    // anything shorter than prefix+number+code is noise
    min_len: 13,
    pattern: &DISCISRC_PATTERN,
    split_cr: false,
};

static CDDA2WAV_GRAMMAR: Grammar = Grammar {
    prefix: "T:",
    exclude_prefix: None,
    needle: None,
    min_len: 0,
    pattern: &CDDA2WAV_PATTERN,
    // cdda2wav mixes \r and \n line endings in its progress output, so
    // several records can share one \n-delimited line
    split_cr: true,
};

static CD_INFO_GRAMMAR: Grammar = Grammar {
    prefix: "TRACK",
    exclude_prefix: None,
    needle: None,
    min_len: 0,
    pattern: &CD_INFO_PATTERN,
    split_cr: false,
};

static MEDIATOOLS_GRAMMAR: Grammar = Grammar {
    prefix: "ISRC",
    // the summary row "ISRCS: n" must not be mistaken for a track
    exclude_prefix: Some("ISRCS"),
    needle: None,
    min_len: 0,
    pattern: &MEDIATOOLS_PATTERN,
    split_cr: false,
};

static DRUTIL_GRAMMAR: Grammar = Grammar {
    prefix: "Track",
    exclude_prefix: None,
    // drutil subchannel output repeats track headers; only rows carrying a
    // block address hold an ISRC
    needle: Some("block"),
    min_len: 0,
    pattern: &DRUTIL_PATTERN,
    split_cr: false,
};

/// Result of scanning one backend's output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// `(track number, code)` pairs in stream order, unvalidated
    pub pairs: Vec<ParsedPair>,
    /// Soft parse warnings: candidate lines the pattern could not match
    pub warnings: u32,
}

/// Input source for [`gather`]
pub enum BackendSource<R> {
    /// Decoded stdout/stderr of the reading tool
    Stream(R),
    /// Path to the TOC sidecar file a tool wrote; removed after reading
    Sidecar(PathBuf),
}

/// Parse one backend's output into `(track number, code)` pairs.
///
/// Dispatches on the source kind: streaming backends consume `Stream`,
/// the cdrdao backend consumes `Sidecar`. A mismatch is
/// [`Error::SourceMismatch`].
pub fn gather<R: BufRead>(ctx: &SessionContext, source: BackendSource<R>) -> Result<ScanOutput> {
    match source {
        BackendSource::Stream(reader) if !ctx.backend.uses_sidecar() => parse_stream(reader, ctx),
        BackendSource::Sidecar(path) if ctx.backend.uses_sidecar() => {
            sidecar::parse_toc_file(&path, ctx)
        }
        BackendSource::Stream(_) => Err(Error::SourceMismatch {
            backend: ctx.backend.to_string(),
            expected: "sidecar file",
        }),
        BackendSource::Sidecar(_) => Err(Error::SourceMismatch {
            backend: ctx.backend.to_string(),
            expected: "stream",
        }),
    }
}

/// Scan a line stream with the grammar of `ctx.backend`.
///
/// The reader is consumed exactly once, end to end; it is dropped on every
/// exit path. A read error mid-stream ends the scan with a warning; the
/// pairs parsed so far are kept, never lost.
pub fn parse_stream<R: BufRead>(reader: R, ctx: &SessionContext) -> Result<ScanOutput> {
    let grammar = ctx.backend.grammar().ok_or(Error::SourceMismatch {
        backend: ctx.backend.to_string(),
        expected: "sidecar file",
    })?;

    let mut output = ScanOutput::default();
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(backend = %ctx.backend, "output stream ended early: {err}");
                output.warnings += 1;
                break;
            }
        };
        if ctx.debug {
            debug!(backend = %ctx.backend, raw = %line, "backend line");
        }
        if grammar.split_cr {
            for segment in line.split('\r') {
                scan_segment(grammar, segment, &mut output);
            }
        } else {
            scan_segment(grammar, &line, &mut output);
        }
    }
    Ok(output)
}

/// Apply the grammar filters and pattern to one line (or `\r` segment)
fn scan_segment(grammar: &Grammar, text: &str, output: &mut ScanOutput) {
    if !text.starts_with(grammar.prefix) {
        return;
    }
    if let Some(exclude) = grammar.exclude_prefix {
        if text.starts_with(exclude) {
            return;
        }
    }
    if text.len() < grammar.min_len {
        return;
    }
    if let Some(needle) = grammar.needle {
        if !text.contains(needle) {
            return;
        }
    }

    let Some(captures) = grammar.pattern.captures(text) else {
        warn!(line = %text, "can't find ISRC in line");
        output.warnings += 1;
        return;
    };
    let Ok(track_number) = captures[1].parse::<u32>() else {
        warn!(line = %text, "track number does not fit in u32");
        output.warnings += 1;
        return;
    };
    let isrc = format!(
        "{}{}{}{}",
        &captures[2], &captures[3], &captures[4], &captures[5]
    );
    output.pairs.push(ParsedPair::new(track_number, isrc));
}

// ============================================================================
// Tests
// ============================================================================
