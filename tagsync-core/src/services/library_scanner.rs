//! Library folder scanning and bulk tag reads
//!
//! Discovery walks the folder sequentially (symlink loop detection needs
//! shared state); tag reads then run on the rayon pool, one file per task.

use crate::error::{Result, TagError};
use crate::formats::AdapterRegistry;
use crate::tags::CanonicalTag;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Tags read from one scanned file
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub tag: CanonicalTag,
}

/// Outcome of reading a batch of files
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Per-file results, in input order
    pub files: Vec<ScannedFile>,
    /// Number of reads that degraded
    pub error_count: usize,
    /// File count per audio format name
    pub by_format: BTreeMap<String, usize>,
}

/// Audio file discovery under a library root
pub struct LibraryScanner<'a> {
    registry: &'a AdapterRegistry,
    ignore_patterns: Vec<String>,
    max_depth: Option<usize>,
}

impl<'a> LibraryScanner<'a> {
    /// Scanner accepting every extension the registry supports
    ///
    /// Ignores system entries like .DS_Store, Thumbs.db and VCS folders.
    pub fn new(registry: &'a AdapterRegistry) -> Self {
        Self {
            registry,
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                "@eaDir".to_string(),
            ],
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Every supported audio file under `root`, sorted by path
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(TagError::Common(tagsync_common::Error::NotFound(
                root.display().to_string(),
            )));
        }
        if !root.is_dir() {
            return Err(TagError::Common(tagsync_common::Error::InvalidInput(format!(
                "Not a directory: {}",
                root.display()
            ))));
        }

        let mut symlink_visited = HashSet::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_supported(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Error accessing entry"),
            }
        }
        files.sort();

        debug!(root = %root.display(), files = files.len(), "Scan complete");
        Ok(files)
    }

    fn should_process_entry(&self, entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
        let file_name = entry.file_name().to_string_lossy();
        if entry.depth() > 0 && file_name.starts_with('.') {
            return false;
        }
        if self.ignore_patterns.iter().any(|p| file_name.contains(p.as_str())) {
            return false;
        }

        if entry.file_type().is_symlink() {
            if let Ok(canonical) = entry.path().canonicalize() {
                if !symlink_visited.insert(canonical) {
                    warn!(path = %entry.path().display(), "Symlink loop detected");
                    return false;
                }
            }
        }
        true
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.registry.supports_extension(ext))
            .unwrap_or(false)
    }
}

/// Read tags of every file on the rayon pool
///
/// Reads never fail; degraded reads are counted in `error_count`.
pub fn read_all(registry: &AdapterRegistry, files: &[PathBuf]) -> ScanReport {
    let scanned: Vec<ScannedFile> = files
        .par_iter()
        .map(|path| ScannedFile {
            path: path.clone(),
            tag: registry.read(path),
        })
        .collect();

    let mut report = ScanReport::default();
    for file in &scanned {
        if !file.tag.is_valid {
            report.error_count += 1;
        }
        *report
            .by_format
            .entry(file.tag.quality.format.name().to_string())
            .or_insert(0) += 1;
    }
    report.files = scanned;
    report
}
