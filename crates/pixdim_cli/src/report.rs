use humansize::{BINARY, format_size};
use pixdim::{Measurement, SizeError};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

fn lossy_path<S: Serializer>(path: &Path, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.to_string_lossy())
}

/// Outcome of probing one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    pub format: Option<&'static str>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub error: Option<String>,
    pub error_kind: Option<&'static str>,
    pub file_size: u64,
    pub bytes_read: u64,
    pub seeks: u64,
    pub mmap: bool,
}

impl FileReport {
    pub fn new(path: PathBuf, file_size: u64, mmap: bool, m: Measurement) -> Self {
        let (size, error) = match m.result {
            Ok(size) => (Some(size), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            path,
            format: m.format.map(|f| f.name()),
            width: size.map(|s| s.width),
            height: size.map(|s| s.height),
            error_kind: error.as_ref().map(SizeError::kind),
            error: error.map(|e| e.to_string()),
            file_size,
            bytes_read: m.stats.bytes_read,
            seeks: m.stats.seeks,
            mmap,
        }
    }

    pub fn open_failed(path: PathBuf, e: SizeError) -> Self {
        Self {
            path,
            format: None,
            width: None,
            height: None,
            error_kind: Some(e.kind()),
            error: Some(e.to_string()),
            file_size: 0,
            bytes_read: 0,
            seeks: 0,
            mmap: false,
        }
    }
}

pub fn write_line(out: &mut impl Write, r: &FileReport) -> io::Result<()> {
    match (&r.error, r.width, r.height) {
        (None, Some(w), Some(h)) => writeln!(
            out,
            "{}: {w}x{h} ({})",
            r.path.display(),
            r.format.unwrap_or("?")
        ),
        (error, ..) => writeln!(
            out,
            "{}: error: {}",
            r.path.display(),
            error.as_deref().unwrap_or("no size")
        ),
    }
}

pub fn write_json(out: &mut impl Write, r: &FileReport) -> io::Result<()> {
    serde_json::to_writer(&mut *out, r).map_err(io::Error::other)?;
    writeln!(out)
}

/// Running totals over all reports.
#[derive(Debug, Default)]
pub struct Summary {
    files: u64,
    mapped: u64,
    failures: u64,
    total_size: u64,
    bytes_read: u64,
    seeks: u64,
    by_format: BTreeMap<&'static str, u64>,
    by_kind: BTreeMap<&'static str, u64>,
}

impl Summary {
    pub fn record(&mut self, r: &FileReport) {
        self.files += 1;
        self.mapped += u64::from(r.mmap);
        self.total_size += r.file_size;
        self.bytes_read += r.bytes_read;
        self.seeks += r.seeks;
        if let Some(format) = r.format {
            *self.by_format.entry(format).or_default() += 1;
        }
        if let Some(kind) = r.error_kind {
            self.failures += 1;
            *self.by_kind.entry(kind).or_default() += 1;
        }
    }

    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn write(&self, out: &mut impl Write) -> io::Result<()> {
        let read_pct = if self.total_size == 0 {
            0.0
        } else {
            self.bytes_read as f64 * 100.0 / self.total_size as f64
        };
        let seeks_per_file = if self.files == 0 {
            0.0
        } else {
            self.seeks as f64 / self.files as f64
        };

        writeln!(out)?;
        writeln!(out, "Files:        {:>12} ({} mapped)", self.files, self.mapped)?;
        writeln!(out, "Total size:   {:>12}", format_size(self.total_size, BINARY))?;
        writeln!(
            out,
            "Bytes read:   {:>12} ({read_pct:.3}%)",
            format_size(self.bytes_read, BINARY)
        )?;
        writeln!(out, "Seeks:        {:>12} ({seeks_per_file:.1} per file)", self.seeks)?;
        for (format, count) in &self.by_format {
            writeln!(out, "  {format:<11} {count:>12}")?;
        }
        writeln!(out, "Failures:     {:>12}", self.failures)?;
        for (kind, count) in &self.by_kind {
            writeln!(out, "  {kind:<11} {count:>12}")?;
        }
        Ok(())
    }
}
