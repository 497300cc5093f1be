use crate::config::FilterConfig;
use crate::error::{ExportError, Result};
use crate::scanner::file_filter::SourceFilter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self {
            source_path,
            relative_path,
            filename,
            extension,
            size,
            modified,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

pub struct SourceScanner {
    filter: SourceFilter,
}

impl SourceScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: SourceFilter::new(config),
        }
    }

    /// Walk the root and collect every eligible source file, sorted by
    /// relative path. Symlinks are never followed, which also forecloses
    /// cycles.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<SourceFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() || !root_path.is_dir() {
            return Err(ExportError::InvalidRoot {
                path: root_path.display().to_string(),
            });
        }

        let mut sources = Vec::new();
        let mut scan_errors = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.process_file(&entry, root_path) {
                    Ok(Some(source_file)) => sources.push(source_file),
                    Ok(None) => {} // File filtered out
                    Err(err) => {
                        scan_errors.push(format!(
                            "Error processing {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        if !scan_errors.is_empty() && sources.is_empty() {
            return Err(ExportError::Permission {
                path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
            });
        }

        if sources.is_empty() {
            return Err(ExportError::NoSourcesFound {
                searched_extensions: self.filter.extensions().clone(),
            });
        }

        // Sorted order makes output reproducible and, in flat mode, makes
        // name-collision outcomes deterministic (last writer wins).
        sources.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(sources)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.file_type().is_file() {
            return true;
        }

        if entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<SourceFile>> {
        let path = entry.path();

        let relative_path = self.calculate_relative_path(path, root_path)?;

        if !self.filter.is_eligible(&relative_path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| ExportError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Ok(None);
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let source_file =
            SourceFile::new(path.to_path_buf(), relative_path, metadata.len(), modified);

        Ok(Some(source_file))
    }

    fn calculate_relative_path(&self, file_path: &Path, root_path: &Path) -> Result<PathBuf> {
        let relative = file_path
            .strip_prefix(root_path)
            .map_err(|_| ExportError::Permission {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    file_path.display(),
                    root_path.display()
                ),
            })?;

        // The walk never produces `..`, but the invariant is cheap to hold.
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(ExportError::Permission {
                path: format!(
                    "Path contains parent directory references: {}",
                    relative.display()
                ),
            });
        }

        Ok(relative.to_path_buf())
    }

    pub fn get_statistics(&self, sources: &[SourceFile]) -> ScanStatistics {
        let total_files = sources.len();
        let total_size = sources.iter().map(|s| s.size).sum();

        let mut files_by_extension = std::collections::HashMap::new();
        for source in sources {
            *files_by_extension
                .entry(source.extension.clone())
                .or_insert(0) += 1;
        }

        let (largest_file_size, largest_file_path) = sources
            .iter()
            .max_by_key(|s| s.size)
            .map(|s| (s.size, s.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files,
            total_size,
            files_by_extension,
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub files_by_extension: std::collections::HashMap<String, usize>,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Total files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if !self.files_by_extension.is_empty() {
            summary.push_str("  Files by type:\n");
            let mut extensions: Vec<_> = self.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1));

            for (ext, count) in extensions {
                summary.push_str(&format!("    {}: {} files\n", ext, count));
            }
        }

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_path.display(),
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
