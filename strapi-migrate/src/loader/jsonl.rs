//! JSON-lines reading shared by the entity and link loaders.
//!
//! Lines are read as raw bytes so that one line with broken UTF-8 is reported
//! like any other malformed record instead of ending the read.

use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::errors::ParseError;

/// Counters for one pass over a JSON-lines source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineStats {
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines that parsed into a record.
    pub parsed: usize,
    /// Lines that were logged and skipped.
    pub malformed: usize,
}

impl LineStats {
    pub fn merge(&mut self, other: LineStats) {
        self.lines += other.lines;
        self.parsed += other.parsed;
        self.malformed += other.malformed;
    }
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_line<T: DeserializeOwned>(
    bytes: &[u8],
    line: usize,
) -> Result<Option<T>, ParseError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::new(line, format!("invalid UTF-8: {}", e)))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ParseError::new(line, e.to_string()))
}

/// Read every record of `reader`, handing each parsed one to `on_record`.
///
/// Malformed lines are logged under `source` and skipped. Only a failure of
/// the underlying reader is returned as an error.
pub async fn read_records<R, T, F>(
    mut reader: R,
    source: &str,
    mut on_record: F,
) -> std::io::Result<LineStats>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
    F: FnMut(T),
{
    let mut stats = LineStats::default();
    let mut buf = Vec::new();
    let mut line = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line += 1;

        match parse_line::<T>(&buf, line) {
            Ok(None) => {}
            Ok(Some(record)) => {
                stats.lines += 1;
                stats.parsed += 1;
                on_record(record);
            }
            Err(e) => {
                stats.lines += 1;
                stats.malformed += 1;
                warn!(source = source, line = e.line, error = %e.reason, "Skipping malformed line");
            }
        }
    }

    Ok(stats)
}
