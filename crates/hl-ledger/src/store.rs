//! Line-delimited ledger files.
//!
//! One canonical record per line. Blank lines are ignored; line numbers reported in
//! errors are the one-based physical lines of the file.

use crate::builder::ChainTip;
use crate::entry::Entry;
use crate::error::{LedgerError, StructuralError};
use crate::verify::{ChainVerifier, VerificationReport, VerifyError};
use hl_canon::HashAlgorithm;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Lines, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parse one stored line into an entry.
///
/// Integers outside the 64-bit range are rejected: they would be read back as floats
/// and no longer re-encode to the bytes that were hashed.
pub fn parse_record(line: usize, text: &str) -> Result<Entry, StructuralError> {
    let text = text.trim();
    let entry = serde_json::from_str(text).map_err(|e| StructuralError::MalformedRecord {
        line,
        message: e.to_string(),
    })?;
    check_integer_literals(line, text)?;
    Ok(entry)
}

/// Scan already-valid JSON text for integer literals that overflow `i64` and `u64`.
fn check_integer_literals(line: usize, text: &str) -> Result<(), StructuralError> {
    let bytes = text.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }
        if b == b'-' || b.is_ascii_digit() {
            let start = i;
            while i < bytes.len()
                && matches!(bytes[i], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
            {
                i += 1;
            }
            let literal = &text[start..i];
            let integral = !literal.contains(|c| matches!(c, '.' | 'e' | 'E'));
            if integral && literal.parse::<i64>().is_err() && literal.parse::<u64>().is_err() {
                return Err(StructuralError::MalformedRecord {
                    line,
                    message: format!("integer {literal} is outside the 64-bit range"),
                });
            }
            continue;
        }
        i += 1;
    }
    Ok(())
}

/// A ledger stored as a JSONL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    /// Refer to a ledger file. Nothing is touched on disk until it is read or written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Lazily read `(line_number, entry)` pairs in file order.
    pub fn records(&self) -> Result<Records, LedgerError> {
        let file = File::open(&self.path).map_err(|e| LedgerError::io(&self.path, e))?;
        Ok(Records {
            path: self.path.clone(),
            lines: BufReader::new(file).lines(),
            line: 0,
        })
    }

    /// Read every entry into memory.
    pub fn read_all(&self) -> Result<Vec<Entry>, LedgerError> {
        self.records()?
            .map(|record| record.map(|(_, entry)| entry))
            .collect()
    }

    /// Scan the file for its current tip, without verifying it.
    ///
    /// A missing file is an empty ledger.
    pub fn tip(&self) -> Result<ChainTip, LedgerError> {
        let mut tip = ChainTip::genesis();
        if !self.exists() {
            return Ok(tip);
        }
        for record in self.records()? {
            let (_, entry) = record?;
            tip.advance(&entry);
        }
        Ok(tip)
    }

    /// Append one entry as a canonical line.
    pub fn append(&self, entry: &Entry) -> Result<(), LedgerError> {
        self.append_all(std::slice::from_ref(entry))
    }

    /// Append entries in order with a single write.
    ///
    /// A last line left without its newline is terminated first. If the write fails the
    /// file is truncated back to its previous length.
    pub fn append_all(&self, entries: &[Entry]) -> Result<(), LedgerError> {
        let mut buf = String::new();
        for entry in entries {
            buf.push_str(&entry.to_canonical_line()?);
            buf.push('\n');
        }

        let io_err = |e| LedgerError::io(&self.path, e);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let start = file.metadata().map_err(io_err)?.len();
        if !buf.is_empty() && !ends_with_newline(&mut file, start).map_err(io_err)? {
            warn!(path = %self.path.display(), "terminating unterminated last line");
            buf.insert(0, '\n');
        }
        append_or_rollback(&mut file, buf.as_bytes(), |file| file.set_len(start))
            .map_err(io_err)?;

        debug!(
            path = %self.path.display(),
            count = entries.len(),
            "appended entries"
        );
        Ok(())
    }

    /// Verify the file end to end.
    ///
    /// Chain failures are reported in the returned report; unreadable or malformed
    /// records are errors.
    pub fn verify(&self, algorithm: HashAlgorithm) -> Result<VerificationReport, LedgerError> {
        let mut verifier = ChainVerifier::new(algorithm);
        for record in self.records()? {
            let (line, entry) = record?;
            match verifier.check(Some(line), &entry) {
                Ok(()) => {}
                Err(VerifyError::Chain(failure)) => return Ok(verifier.finish(Some(failure))),
                Err(VerifyError::Structural(err)) => return Err(err.into()),
            }
        }

        let report = verifier.finish(None);
        info!(
            path = %self.path.display(),
            entries = report.entries_verified,
            "ledger verified"
        );
        Ok(report)
    }
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Write `bytes` in full, or run `rollback` and return the write error.
fn append_or_rollback<W: Write>(
    writer: &mut W,
    bytes: &[u8],
    rollback: impl FnOnce(&mut W) -> io::Result<()>,
) -> io::Result<()> {
    match writer.write_all(bytes).and_then(|()| writer.flush()) {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Err(rollback_err) = rollback(writer) {
                warn!(error = %rollback_err, "could not roll back a partial append");
            }
            Err(err)
        }
    }
}

/// Iterator over the records of a [`LedgerFile`].
pub struct Records {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
}

impl Iterator for Records {
    type Item = Result<(usize, Entry), LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(LedgerError::io(&self.path, e))),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return Some(
                parse_record(self.line, &text)
                    .map(|entry| (self.line, entry))
                    .map_err(LedgerError::from),
            );
        }
    }
}
