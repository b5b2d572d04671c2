//! Line-atomic writer for resolution results.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use parking_lot::Mutex;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Outcome of resolving one hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub hostname: String,
    /// `None` when resolution failed.
    pub address: Option<IpAddr>,
}

impl ResultRecord {
    pub fn new(hostname: impl Into<String>, address: Option<IpAddr>) -> Self {
        Self {
            hostname: hostname.into(),
            address,
        }
    }
}

/// Formats as `"<hostname>, <address>"`, with an empty address on failure.
impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(ip) => write!(f, "{}, {}", self.hostname, ip),
            None => write!(f, "{}, ", self.hostname),
        }
    }
}

/// Serializes result lines onto one output stream.
///
/// The writer has its own lock, unrelated to the queue lock. Each record is
/// rendered into a complete line before the lock is taken and written with
/// a single `write_all`, so lines from different consumers never interleave.
pub struct OutputWriter {
    sink: Mutex<BufWriter<Box<dyn Write + Send>>>,
    lines: AtomicUsize,
}

impl OutputWriter {
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            sink: Mutex::new(BufWriter::new(Box::new(writer))),
            lines: AtomicUsize::new(0),
        }
    }

    /// Creates (or truncates) the output file at `path`.
    pub fn create(path: &Path) -> Result<Self, NetError> {
        let file = File::create(path).open_context(path)?;
        Ok(Self::new(file))
    }

    /// Writes one `"<hostname>, <address>\n"` line.
    pub fn write_record(&self, record: &ResultRecord) -> Result<(), NetError> {
        let line = format!("{record}\n");
        self.sink.lock().write_all(line.as_bytes()).write_context()?;
        self.lines.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of lines written so far.
    pub fn lines_written(&self) -> usize {
        self.lines.load(Ordering::Relaxed)
    }

    /// Flushes buffered lines and returns the total written.
    pub fn finish(&self) -> Result<usize, NetError> {
        self.sink.lock().flush().write_context()?;
        Ok(self.lines_written())
    }
}

impl fmt::Debug for OutputWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputWriter")
            .field("lines", &self.lines_written())
            .finish_non_exhaustive()
    }
}
