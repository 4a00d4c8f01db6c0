use crossbeam_channel::{Receiver, Sender, bounded};
use pixdim::{ImageFormat, Limits};
use pixdim_io::ReaderOptions;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::report::FileReport;

const PATH_CHANNEL_CAPACITY: usize = 256;
const REPORT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub recursive: bool,
    /// Lowercase extensions without the dot; empty means "known image types".
    pub extensions: Vec<String>,
    pub all: bool,
    pub jobs: usize,
    pub reader: ReaderOptions,
    pub limits: Limits,
}

impl ScanConfig {
    /// Whether a file found while walking a directory should be measured.
    /// Paths named explicitly on the command line are always measured.
    pub fn wants(&self, path: &Path) -> bool {
        if self.all {
            return true;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if self.extensions.is_empty() {
            ImageFormat::from_extension(ext).is_some()
        } else {
            self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        }
    }
}

/// Walks `inputs`, handing each selected file to `visit` until it returns false.
fn walk_inputs(inputs: &[PathBuf], config: &ScanConfig, mut visit: impl FnMut(PathBuf) -> bool) {
    for input in inputs {
        if !input.is_dir() {
            if !visit(input.clone()) {
                return;
            }
            continue;
        }

        let mut walker = WalkDir::new(input).follow_links(false).sort_by_file_name();
        if !config.recursive {
            walker = walker.max_depth(1);
        }
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && config.wants(entry.path()) && !visit(entry.into_path()) {
                return;
            }
        }
    }
}

fn measure(path: PathBuf, config: &ScanConfig) -> FileReport {
    match pixdim_io::open(&path, &config.reader) {
        Ok(reader) => {
            let file_size = reader.size();
            let mmap = reader.is_mmap();
            let m = pixdim::measure_with(reader, config.limits);
            FileReport::new(path, file_size, mmap, m)
        }
        Err(e) => FileReport::open_failed(path, e),
    }
}

fn worker_thread(rx: Receiver<PathBuf>, tx: Sender<FileReport>, config: ScanConfig) {
    for path in rx {
        if tx.send(measure(path, &config)).is_err() {
            break;
        }
    }
}

/// Measures every selected file on a pool of `config.jobs` workers, calling
/// `on_report` on this thread as results arrive.
pub fn run(
    inputs: &[PathBuf],
    config: &ScanConfig,
    mut on_report: impl FnMut(FileReport),
) -> anyhow::Result<()> {
    let (path_tx, path_rx) = bounded::<PathBuf>(PATH_CHANNEL_CAPACITY);
    let (report_tx, report_rx) = bounded::<FileReport>(REPORT_CHANNEL_CAPACITY);

    debug!(workers = config.jobs, "starting scan");

    let producer_inputs = inputs.to_vec();
    let producer_config = config.clone();
    let producer_handle = thread::Builder::new()
        .name("walker".to_string())
        .spawn(move || {
            walk_inputs(&producer_inputs, &producer_config, |path| {
                path_tx.send(path).is_ok()
            });
        })?;

    let mut worker_handles = Vec::with_capacity(config.jobs);
    for worker_id in 0..config.jobs {
        let rx = path_rx.clone();
        let tx = report_tx.clone();
        let worker_config = config.clone();
        let handle = thread::Builder::new()
            .name(format!("scan-{worker_id}"))
            .spawn(move || worker_thread(rx, tx, worker_config))?;
        worker_handles.push(handle);
    }

    drop(path_rx);
    drop(report_tx);

    for report in report_rx {
        on_report(report);
    }

    if producer_handle.join().is_err() {
        anyhow::bail!("walker thread panicked");
    }
    for (i, handle) in worker_handles.into_iter().enumerate() {
        if handle.join().is_err() {
            anyhow::bail!("worker thread {i} panicked");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config() -> ScanConfig {
        ScanConfig {
            recursive: false,
            extensions: Vec::new(),
            all: false,
            jobs: 2,
            reader: ReaderOptions::default(),
            limits: Limits::default(),
        }
    }

    fn gif(width: u16, height: u16) -> Vec<u8> {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data.extend_from_slice(&[0, 0, 0]);
        data
    }

    #[test]
    fn test_wants_known_extensions() {
        let config = config();
        assert!(config.wants(Path::new("a/photo.JPG")));
        assert!(config.wants(Path::new("b.avif")));
        assert!(!config.wants(Path::new("notes.txt")));
        assert!(!config.wants(Path::new("Makefile")));
    }

    #[test]
    fn test_wants_explicit_extensions() {
        let config = ScanConfig {
            extensions: vec!["txt".to_string()],
            ..config()
        };
        assert!(config.wants(Path::new("notes.TXT")));
        assert!(!config.wants(Path::new("photo.jpg")));

        let config = ScanConfig { all: true, ..config };
        assert!(config.wants(Path::new("Makefile")));
    }

    #[test]
    fn test_run_scans_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.gif"), gif(320, 200)).unwrap();
        fs::write(dir.path().join("b.gif"), b"GIF89a").unwrap();
        fs::write(dir.path().join("c.txt"), b"hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.gif"), gif(1, 2)).unwrap();

        let mut reports = Vec::new();
        run(&[dir.path().to_path_buf()], &config(), |r| reports.push(r)).unwrap();
        reports.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(reports.len(), 2);
        assert_eq!((reports[0].width, reports[0].height), (Some(320), Some(200)));
        assert_eq!(reports[0].format, Some("GIF"));
        assert!(reports[1].error.is_some());
        assert_eq!(reports[1].error_kind, Some("truncated"));
    }

    #[test]
    fn test_run_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.gif"), gif(1, 2)).unwrap();

        let config = ScanConfig {
            recursive: true,
            ..config()
        };
        let mut reports = Vec::new();
        run(&[dir.path().to_path_buf()], &config, |r| reports.push(r)).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].height, Some(2));
    }

    #[test]
    fn test_missing_explicit_path_is_reported() {
        let dir = tempdir().unwrap();
        let mut reports = Vec::new();
        run(&[dir.path().join("gone.png")], &config(), |r| reports.push(r)).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].error_kind, Some("io"));
    }
}
