use crate::error::{ExportError, Result};
use crate::exporter::file_exporter::ExportProgress;
use crate::exporter::layout::LayoutMode;
use crate::scanner::SourceFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub root_path: String,
    pub layout: LayoutMode,
    pub output_location: String,
    pub export_summary: ExportSummary,
    pub files: Vec<FileInfo>,
    pub export_time: DateTime<Utc>,
    pub failures: Vec<FailureInfo>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total_files_exported: usize,
    pub total_bytes_written: u64,
    pub export_duration: Duration,
    pub files_by_extension: std::collections::HashMap<String, usize>,
    pub average_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub relative_path: String,
    pub extension: String,
    pub size: u64,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub exclude_dirs: Vec<String>,
    pub layout: LayoutMode,
}

impl From<&SourceFile> for FileInfo {
    fn from(source: &SourceFile) -> Self {
        Self {
            filename: source.filename.clone(),
            relative_path: source.relative_path.to_string_lossy().to_string(),
            extension: source.extension.clone(),
            size: source.size,
            modified: source.modified,
        }
    }
}

pub struct OutputManager {
    base_path: PathBuf,
    output_directory: PathBuf,
}

impl OutputManager {
    pub fn new(base_path: PathBuf, layout: LayoutMode) -> Result<Self> {
        let output_directory = base_path.join(layout.export_dir_name());

        let manager = Self {
            base_path,
            output_directory,
        };

        manager.validate_paths()?;
        Ok(manager)
    }

    /// Recreate the output directory empty. A previous export (or any
    /// other leftover) is removed wholesale first, which makes repeated
    /// runs idempotent. Failure here aborts the run.
    pub fn initialize(&self) -> Result<()> {
        if self.output_directory.exists() {
            fs::remove_dir_all(&self.output_directory).map_err(|e| ExportError::Setup {
                path: self.output_directory.display().to_string(),
                source: e,
            })?;
        }

        fs::create_dir_all(&self.output_directory).map_err(|e| ExportError::Setup {
            path: self.output_directory.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn create_export_report(
        &self,
        root_path: &Path,
        layout: LayoutMode,
        sources: &[SourceFile],
        progress: &ExportProgress,
        config: &ConfigSnapshot,
    ) -> ExportReport {
        let export_summary = create_export_summary(sources, progress);
        let file_infos: Vec<FileInfo> = sources.iter().map(FileInfo::from).collect();

        let failures = progress
            .failures
            .iter()
            .map(|f| FailureInfo {
                path: f.path.display().to_string(),
                message: f.message.clone(),
            })
            .collect();

        ExportReport {
            root_path: root_path.display().to_string(),
            layout,
            output_location: self.output_directory.display().to_string(),
            export_summary,
            files: file_infos,
            export_time: Utc::now(),
            failures,
            config_used: config.clone(),
        }
    }

    /// Write the report under `.codexport/` inside the output directory,
    /// both machine-readable and plain text.
    pub fn write_report_files(&self, report: &ExportReport) -> Result<()> {
        let metadata_dir = self.get_metadata_dir();
        fs::create_dir_all(&metadata_dir).map_err(ExportError::Io)?;

        self.save_report_json(report)?;
        self.save_report_text(report)?;

        Ok(())
    }

    fn save_report_json(&self, report: &ExportReport) -> Result<()> {
        let report_path = self.get_metadata_dir().join("export_report.json");
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| ExportError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(&report_path, json_content).map_err(ExportError::Io)?;

        Ok(())
    }

    fn save_report_text(&self, report: &ExportReport) -> Result<()> {
        let report_path = self.get_metadata_dir().join("export_report.txt");
        let mut file = fs::File::create(&report_path).map_err(ExportError::Io)?;

        writeln!(file, "Codexport Export Report")?;
        writeln!(file, "=======================")?;
        writeln!(file)?;

        writeln!(file, "Source root: {}", report.root_path)?;
        writeln!(file, "Layout: {}", report.layout)?;
        writeln!(file, "Output location: {}", report.output_location)?;
        writeln!(file)?;

        writeln!(file, "Export Summary:")?;
        writeln!(
            file,
            "  Exported at: {}",
            report.export_time.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            file,
            "  Duration: {:?}",
            report.export_summary.export_duration
        )?;
        writeln!(
            file,
            "  Files exported: {}",
            report.export_summary.total_files_exported
        )?;
        writeln!(
            file,
            "  Bytes written: {} ({})",
            report.export_summary.total_bytes_written,
            format_bytes(report.export_summary.total_bytes_written)
        )?;
        writeln!(
            file,
            "  Average file size: {} ({})",
            report.export_summary.average_file_size,
            format_bytes(report.export_summary.average_file_size)
        )?;
        writeln!(file)?;

        if !report.export_summary.files_by_extension.is_empty() {
            writeln!(file, "Files by extension:")?;
            let mut extensions: Vec<_> =
                report.export_summary.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1));

            for (ext, count) in extensions {
                writeln!(file, "  {}: {} files", ext, count)?;
            }
            writeln!(file)?;
        }

        writeln!(file, "Configuration used:")?;
        writeln!(
            file,
            "  Extensions: {}",
            report.config_used.extensions.join(", ")
        )?;
        writeln!(
            file,
            "  Max file size: {} ({})",
            report.config_used.max_file_size,
            format_bytes(report.config_used.max_file_size)
        )?;
        writeln!(
            file,
            "  Excluded directories: {}",
            report.config_used.exclude_dirs.join(", ")
        )?;
        writeln!(file, "  Layout: {}", report.config_used.layout)?;
        writeln!(file)?;

        if !report.failures.is_empty() {
            writeln!(file, "Failures:")?;
            for failure in &report.failures {
                writeln!(file, "  - {}: {}", failure.path, failure.message)?;
            }
            writeln!(file)?;
        }

        writeln!(file, "Exported files:")?;
        for file_info in &report.files {
            writeln!(
                file,
                "  {} ({} bytes)",
                file_info.relative_path, file_info.size
            )?;
        }

        Ok(())
    }

    fn validate_paths(&self) -> Result<()> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).map_err(|e| ExportError::Permission {
                path: format!(
                    "Cannot create base directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            })?;
        }

        let test_file = self.base_path.join(".codexport_write_test");
        match fs::File::create(&test_file) {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                return Err(ExportError::Permission {
                    path: format!(
                        "No write permission for directory {}: {}",
                        self.base_path.display(),
                        e
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn get_metadata_dir(&self) -> PathBuf {
        self.output_directory.join(".codexport")
    }
}

fn create_export_summary(sources: &[SourceFile], progress: &ExportProgress) -> ExportSummary {
    let mut files_by_extension: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();

    for source in sources {
        *files_by_extension.entry(source.extension.clone()).or_insert(0) += 1;
    }

    let average_file_size = if progress.files_exported == 0 {
        0
    } else {
        progress.bytes_written / progress.files_exported as u64
    };

    ExportSummary {
        total_files_exported: progress.files_exported,
        total_bytes_written: progress.bytes_written,
        export_duration: progress.elapsed(),
        files_by_extension,
        average_file_size,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_source(name: &str, size: u64) -> SourceFile {
        SourceFile::new(
            PathBuf::from(name),
            PathBuf::from(name),
            size,
            SystemTime::UNIX_EPOCH,
        )
    }

    fn create_test_config() -> ConfigSnapshot {
        ConfigSnapshot {
            extensions: vec!["cs".to_string()],
            max_file_size: 1024 * 1024,
            exclude_dirs: vec![],
            layout: LayoutMode::Nested,
        }
    }

    #[test]
    fn test_output_manager_resolves_mode_directory() {
        let temp_dir = TempDir::new().unwrap();

        let nested =
            OutputManager::new(temp_dir.path().to_path_buf(), LayoutMode::Nested).unwrap();
        assert_eq!(
            nested.get_output_directory(),
            temp_dir.path().join("CodebaseExport")
        );

        let flat = OutputManager::new(temp_dir.path().to_path_buf(), LayoutMode::Flat).unwrap();
        assert_eq!(
            flat.get_output_directory(),
            temp_dir.path().join("CodebaseExport_Flat")
        );
    }

    #[test]
    fn test_initialize_wipes_previous_export() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            OutputManager::new(temp_dir.path().to_path_buf(), LayoutMode::Nested).unwrap();

        manager.initialize().unwrap();
        fs::write(manager.get_output_directory().join("stale.cs"), "leftover").unwrap();

        manager.initialize().unwrap();

        assert!(manager.get_output_directory().exists());
        assert!(!manager.get_output_directory().join("stale.cs").exists());
    }

    #[test]
    fn test_missing_base_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("does_not_exist_yet");

        let manager = OutputManager::new(base.clone(), LayoutMode::Nested).unwrap();

        assert!(base.exists());
        assert!(manager.get_output_directory().starts_with(&base));
    }

    #[test]
    fn test_report_creation_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            OutputManager::new(temp_dir.path().to_path_buf(), LayoutMode::Nested).unwrap();

        manager.initialize().unwrap();

        let sources = vec![
            create_test_source("README.cs", 100),
            create_test_source("guide.cs", 200),
        ];

        let mut progress = ExportProgress::new(2);
        progress.record_file("README.cs".to_string(), 100);
        progress.record_file("guide.cs".to_string(), 200);

        let config = create_test_config();
        let report = manager.create_export_report(
            Path::new("/project"),
            LayoutMode::Nested,
            &sources,
            &progress,
            &config,
        );

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.export_summary.total_files_exported, 2);
        assert_eq!(report.export_summary.total_bytes_written, 300);
        assert_eq!(report.export_summary.average_file_size, 150);
        assert!(report.failures.is_empty());

        manager.write_report_files(&report).unwrap();

        assert!(manager.get_metadata_dir().join("export_report.json").exists());
        assert!(manager.get_metadata_dir().join("export_report.txt").exists());
    }

    #[test]
    fn test_report_records_failures() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            OutputManager::new(temp_dir.path().to_path_buf(), LayoutMode::Flat).unwrap();

        let mut progress = ExportProgress::new(1);
        progress.record_failure(PathBuf::from("/project/bad.cs"), "unreadable".to_string());

        let report = manager.create_export_report(
            Path::new("/project"),
            LayoutMode::Flat,
            &[],
            &progress,
            &create_test_config(),
        );

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "/project/bad.cs");
        assert_eq!(report.failures[0].message, "unreadable");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
