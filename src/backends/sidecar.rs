//! cdrdao TOC sidecar reader
//!
//! cdrdao does not stream ISRCs: the collaborator runs
//! `cdrdao read-toc --fast-toc` into a temporary TOC file and hands this
//! module the path. The file is a scoped resource: it is removed on every
//! exit path (success, parse failure, open or read error) so a crashed run
//! never leaves TOC files in the temp directory.
//!
//! # TOC grammar
//! ```text
//! // Track 1
//! ISRC "USS1Z9900001"
//! ```
//! A line whose first whitespace-separated word is `//` announces a track;
//! its third word is the 1-based track number. A later line starting with
//! `ISRC` supplies the code for the most recently announced track. A code is
//! only accepted while a track announcement is pending, and acceptance
//! clears the pending number. This guards against stray or duplicated ISRC
//! tags (as seen in CD-Text) being attributed to the wrong track.

use crate::config::SessionContext;
use crate::error::Result;
use crate::types::ParsedPair;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

use super::ScanOutput;

/// Codes in a TOC file carry no separators
static TOC_ISRC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{3}[0-9]{7}$").expect("valid regex"));

/// Removes the sidecar file when dropped, on every exit path
struct SidecarGuard<'a> {
    path: &'a Path,
}

impl Drop for SidecarGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(self.path) {
            warn!(path = %self.path.display(), "could not remove TOC sidecar file: {err}");
        }
    }
}

/// Read a cdrdao TOC sidecar file and extract its `(track, code)` pairs.
///
/// The file at `path` is removed before this function returns, whether it
/// parsed cleanly, partially, or not at all.
///
/// # Errors
/// [`crate::Error::Io`] when the file cannot be opened. Read errors after a
/// successful open end the scan with a warning instead, keeping the pairs
/// parsed so far.
pub fn parse_toc_file(path: &Path, ctx: &SessionContext) -> Result<ScanOutput> {
    let _guard = SidecarGuard { path };
    let reader = BufReader::new(File::open(path)?);

    let mut output = ScanOutput::default();
    let mut current_track: Option<u32> = None;

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(path = %path.display(), "TOC file ended early: {err}");
                output.warnings += 1;
                break;
            }
        };
        if ctx.debug {
            debug!(raw = %line, "TOC line");
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = words.first() else {
            continue;
        };

        if first == "//" {
            current_track = match words.get(2).map(|w| w.parse::<u32>()) {
                Some(Ok(number)) => Some(number),
                _ => {
                    warn!(line = %line, "can't read track number from TOC comment");
                    output.warnings += 1;
                    None
                }
            };
        } else if first == "ISRC" {
            // Only accept a code while a track announcement is pending;
            // an orphaned ISRC tag has no owner and is skipped silently.
            let Some(track_number) = current_track else {
                continue;
            };
            let isrc = words[1..]
                .concat()
                .trim_matches(|c| c == '"' || c == '-' || c == ' ')
                .to_string();
            if TOC_ISRC_PATTERN.is_match(&isrc) {
                output.pairs.push(ParsedPair::new(track_number, isrc));
                current_track = None;
            } else {
                warn!(isrc = %isrc, "no valid ISRC in TOC entry");
                output.warnings += 1;
            }
        }
    }

    Ok(output)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::Backend;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_toc(contents: &str) -> PathBuf {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "isrcsubmit-toc-test-{}-{:?}.toc",
            std::process::id(),
            std::thread::current().id()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn ctx() -> SessionContext {
        SessionContext::new(Backend::Cdrdao)
    }

    #[test]
    fn parses_tracks_and_codes() {
        let path = write_toc(
            "CD_DA\n\
             \n\
             // Track 1\n\
             TRACK AUDIO\n\
             ISRC \"USS1Z9900001\"\n\
             FILE \"data.wav\" 0 02:32:00\n\
             \n\
             // Track 2\n\
             TRACK AUDIO\n\
             ISRC \"USS1Z9900002\"\n",
        );
        let output = parse_toc_file(&path, &ctx()).unwrap();

        assert_eq!(output.warnings, 0);
        assert_eq!(
            output.pairs,
            vec![
                ParsedPair::new(1, "USS1Z9900001"),
                ParsedPair::new(2, "USS1Z9900002"),
            ]
        );
        assert!(!path.exists(), "sidecar file removed after success");
    }

    #[test]
    fn orphaned_isrc_tag_is_skipped() {
        // A duplicated ISRC tag (e.g. from CD-Text) after the code was
        // already accepted has no pending track and must not be attributed.
        let path = write_toc(
            "// Track 1\n\
             ISRC \"USS1Z9900001\"\n\
             ISRC \"USS1Z9999999\"\n",
        );
        let output = parse_toc_file(&path, &ctx()).unwrap();

        assert_eq!(output.warnings, 0);
        assert_eq!(output.pairs, vec![ParsedPair::new(1, "USS1Z9900001")]);
    }

    #[test]
    fn invalid_code_warns_and_keeps_pending_track() {
        let path = write_toc(
            "// Track 1\n\
             ISRC \"NOT-AN-ISRC\"\n\
             ISRC \"USS1Z9900001\"\n",
        );
        let output = parse_toc_file(&path, &ctx()).unwrap();

        assert_eq!(output.warnings, 1);
        assert_eq!(
            output.pairs,
            vec![ParsedPair::new(1, "USS1Z9900001")],
            "a later valid tag still belongs to the pending track"
        );
    }

    #[test]
    fn unreadable_track_number_warns() {
        let path = write_toc(
            "// Track one\n\
             ISRC \"USS1Z9900001\"\n",
        );
        let output = parse_toc_file(&path, &ctx()).unwrap();

        assert_eq!(output.warnings, 1);
        assert!(output.pairs.is_empty(), "code without a track number owner");
    }

    #[test]
    fn file_is_removed_even_on_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toc");
        let result = parse_toc_file(&path, &ctx());
        assert!(result.is_err(), "opening a missing file is an IO error");
    }

    #[test]
    fn file_is_removed_after_parse_warnings() {
        let path = write_toc("// Track 1\nISRC \"garbage\"\n");
        let _ = parse_toc_file(&path, &ctx()).unwrap();
        assert!(!path.exists(), "sidecar file removed despite warnings");
    }
}
