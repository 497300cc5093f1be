use crate::error::{ExportError, Result};
use crate::exporter::layout::{self, LayoutMode};
use crate::scanner::SourceFile;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub files_exported: usize,
    pub total_files: usize,
    pub bytes_written: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub failures: Vec<ExportFailure>,
}

impl ExportProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_exported: 0,
            total_files,
            bytes_written: 0,
            current_file: None,
            start_time: Instant::now(),
            failures: Vec::new(),
        }
    }

    pub fn record_file(&mut self, filename: String, bytes: u64) {
        self.files_exported += 1;
        self.bytes_written += bytes;
        self.current_file = Some(filename);
    }

    pub fn record_failure(&mut self, path: PathBuf, message: String) {
        self.failures.push(ExportFailure { path, message });
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_exported as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

pub struct FileExporter {
    layout: LayoutMode,
    preserve_mtime: bool,
}

impl FileExporter {
    pub fn new(layout: LayoutMode) -> Self {
        Self {
            layout,
            preserve_mtime: true,
        }
    }

    pub fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    /// Copy every source into `output_base` under the configured layout.
    ///
    /// Callers reset the output directory beforehand (see
    /// `OutputManager::initialize`); this only creates it when missing.
    /// Per-file read/write errors are recorded and the run continues with
    /// the remaining files.
    pub fn export(
        &self,
        sources: &[SourceFile],
        output_base: &Path,
        progress_callback: Option<&dyn Fn(&ExportProgress)>,
    ) -> Result<ExportProgress> {
        if !output_base.exists() {
            fs::create_dir_all(output_base).map_err(|e| ExportError::Setup {
                path: output_base.display().to_string(),
                source: e,
            })?;
        }

        let mut progress = ExportProgress::new(sources.len());

        for source in sources {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            match self.export_file(source, output_base) {
                Ok(bytes_written) => {
                    progress.record_file(source.filename.clone(), bytes_written);
                }
                Err(e) => {
                    progress.record_failure(source.source_path.clone(), e.to_string());
                }
            }
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(progress)
    }

    fn export_file(&self, source: &SourceFile, output_base: &Path) -> Result<u64> {
        let dest_path = layout::destination(output_base, &source.relative_path, self.layout);

        if self.layout == LayoutMode::Nested {
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = fs::read_to_string(&source.source_path)?;
        let output = compose_output(&source.filename, &source.source_path, &content);

        fs::write(&dest_path, &output)?;

        if self.preserve_mtime {
            let mtime = filetime::FileTime::from_system_time(source.modified);
            let _ = filetime::set_file_mtime(&dest_path, mtime);
        }

        Ok(output.len() as u64)
    }
}

/// The fixed banner block recording a file's original name and location.
pub fn render_banner(filename: &str, source_path: &Path) -> String {
    format!(
        "/* =============================================\n   \
         FILE NAME : {}\n   \
         PATH  : {}\n   \
         ============================================= */",
        filename,
        source_path.display()
    )
}

/// Banner block, blank line, then the original content verbatim.
pub fn compose_output(filename: &str, source_path: &Path, content: &str) -> String {
    format!("{}\n\n{}", render_banner(filename, source_path), content)
}
