pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, LayoutChoice, OutputFormat};
pub use config::{CliOverrides, Config, FilterConfig, OutputConfig};
pub use error::{ExportError, Result, UserFriendlyError};

// Core functionality re-exports
pub use exporter::{
    ConfigSnapshot, ExportFailure, ExportProgress, ExportReport, FileExporter, LayoutMode,
    OutputManager,
};
pub use scanner::{ScanStatistics, SourceFile, SourceFilter, SourceScanner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface for the export pipeline
pub struct CodeExport {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl CodeExport {
    /// Create a new instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an instance without registering a signal handler, for tests
    /// and embedding.
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Run the full export pipeline for a project root
    pub fn export(&self, root: &Path) -> Result<ExportReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation("Starting source export");

        let layout = self.config.output.layout;

        // Step 1: Reset the output directory (fatal on failure). Done
        // before the walk so a previous export inside the root can never
        // be picked up as a candidate.
        let output_manager =
            OutputManager::new(self.config.output.base_directory.clone(), layout)?;
        output_manager.initialize()?;
        self.shutdown.check_shutdown()?;

        // Step 2: Scan for source files
        let sources = self.scan_sources(root)?;
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .info(&format!("Found {} source files", sources.len()));

        // Step 3: Export files
        let progress =
            self.copy_sources(&sources, output_manager.get_output_directory(), layout)?;
        self.shutdown.check_shutdown()?;

        // Step 4: Build the report, optionally persisting it
        let config_snapshot = self.create_config_snapshot();
        let report =
            output_manager.create_export_report(root, layout, &sources, &progress, &config_snapshot);

        if self.config.output.generate_report {
            output_manager.write_report_files(&report)?;
        }

        self.output_formatter
            .print_export_summary(&progress, &report.output_location);

        Ok(report)
    }

    fn scan_sources(&self, root: &Path) -> Result<Vec<SourceFile>> {
        self.output_formatter
            .start_operation("Scanning for source files");

        let scanner = SourceScanner::new(&self.config.filters);
        let sources = scanner.scan_directory(root)?;

        let stats = scanner.get_statistics(&sources);
        self.output_formatter.debug(&stats.display_summary());

        Ok(sources)
    }

    fn copy_sources(
        &self,
        sources: &[SourceFile],
        output_dir: &Path,
        layout: LayoutMode,
    ) -> Result<ExportProgress> {
        self.output_formatter
            .start_operation("Exporting source files");

        let file_progress = self
            .progress_manager
            .create_file_progress(sources.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &ExportProgress| {
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let exporter = FileExporter::new(layout);
        let progress = exporter.export(sources, output_dir, Some(&progress_callback))?;

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Exported {} files", progress.files_exported),
            progress.elapsed(),
        );

        Ok(progress)
    }

    /// Create configuration snapshot for reporting
    fn create_config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            extensions: self.config.filters.extensions.clone(),
            max_file_size: self.config.filters.max_file_size,
            exclude_dirs: self.config.filters.exclude_dirs.clone(),
            layout: self.config.output.layout,
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(ExportError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ExportError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convenience function to export a project with minimal setup
pub fn export_simple(
    root: &Path,
    layout: LayoutMode,
    output_base: Option<&Path>,
) -> Result<ExportReport> {
    let mut config = Config::default();
    config.output.layout = layout;

    if let Some(base) = output_base {
        config.output.base_directory = base.to_path_buf();
    }

    let app = CodeExport::new(config, OutputMode::Plain, 0, true)?;
    app.export(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_app(mut config: Config, base: &Path) -> CodeExport {
        config.output.base_directory = base.to_path_buf();
        CodeExport::new_for_test(config, OutputMode::Plain, 0, true)
    }

    fn write_sample_tree(root: &Path) {
        fs::create_dir_all(root.join("src/bin")).unwrap();
        fs::write(root.join("src/Foo.cs"), "class Foo{}").unwrap();
        fs::write(root.join("src/bin/Gen.cs"), "generated").unwrap();
        fs::write(root.join("Widget.Designer.cs"), "designer").unwrap();
    }

    #[test]
    fn test_flat_export_scenario() {
        let source_dir = TempDir::new().unwrap();
        let base_dir = TempDir::new().unwrap();
        write_sample_tree(source_dir.path());

        let mut config = Config::default();
        config.output.layout = LayoutMode::Flat;
        config.output.generate_report = false;

        let app = quiet_app(config, base_dir.path());
        let report = app.export(source_dir.path()).unwrap();

        assert_eq!(report.export_summary.total_files_exported, 1);
        assert!(report.failures.is_empty());

        let output_dir = base_dir.path().join("CodebaseExport_Flat");
        let entries: Vec<_> = fs::read_dir(&output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["src_Foo.cs"]);

        let written = fs::read_to_string(output_dir.join("src_Foo.cs")).unwrap();
        assert!(written.starts_with("/* ="));
        assert!(written.contains("FILE NAME : Foo.cs"));
        assert!(written.ends_with("class Foo{}"));
    }

    #[test]
    fn test_nested_export_scenario() {
        let source_dir = TempDir::new().unwrap();
        let base_dir = TempDir::new().unwrap();
        write_sample_tree(source_dir.path());

        let mut config = Config::default();
        config.output.generate_report = false;

        let app = quiet_app(config, base_dir.path());
        let report = app.export(source_dir.path()).unwrap();

        assert_eq!(report.export_summary.total_files_exported, 1);

        let output_dir = base_dir.path().join("CodebaseExport");
        let written = fs::read_to_string(output_dir.join("src/Foo.cs")).unwrap();
        assert!(written.ends_with("class Foo{}"));
        assert!(!output_dir.join("src/bin").exists());
        assert!(!output_dir.join("Widget.Designer.cs").exists());
    }

    #[test]
    fn test_export_is_idempotent() {
        let source_dir = TempDir::new().unwrap();
        let base_dir = TempDir::new().unwrap();
        write_sample_tree(source_dir.path());

        let mut config = Config::default();
        config.output.generate_report = false;
        config.output.base_directory = base_dir.path().to_path_buf();

        let app = CodeExport::new_for_test(config.clone(), OutputMode::Plain, 0, true);
        app.export(source_dir.path()).unwrap();

        let output_file = base_dir.path().join("CodebaseExport/src/Foo.cs");
        let first = fs::read_to_string(&output_file).unwrap();

        // A leftover from an interrupted run must disappear on the next one.
        fs::write(base_dir.path().join("CodebaseExport/stale.cs"), "junk").unwrap();

        let app = CodeExport::new_for_test(config, OutputMode::Plain, 0, true);
        app.export(source_dir.path()).unwrap();

        let second = fs::read_to_string(&output_file).unwrap();
        assert_eq!(first, second);
        assert!(!base_dir.path().join("CodebaseExport/stale.cs").exists());
    }

    #[test]
    fn test_report_files_written_when_enabled() {
        let source_dir = TempDir::new().unwrap();
        let base_dir = TempDir::new().unwrap();
        write_sample_tree(source_dir.path());

        let app = quiet_app(Config::default(), base_dir.path());
        app.export(source_dir.path()).unwrap();

        let metadata_dir = base_dir.path().join("CodebaseExport/.codexport");
        assert!(metadata_dir.join("export_report.json").exists());
        assert!(metadata_dir.join("export_report.txt").exists());
    }

    #[test]
    fn test_cancelled_before_start() {
        let source_dir = TempDir::new().unwrap();
        let base_dir = TempDir::new().unwrap();
        write_sample_tree(source_dir.path());

        let app = quiet_app(Config::default(), base_dir.path());
        app.request_shutdown();

        let result = app.export(source_dir.path());
        assert!(matches!(result, Err(ExportError::Cancelled)));
    }

    #[test]
    fn test_export_simple() {
        let source_dir = TempDir::new().unwrap();
        let base_dir = TempDir::new().unwrap();
        write_sample_tree(source_dir.path());

        let report =
            export_simple(source_dir.path(), LayoutMode::Flat, Some(base_dir.path())).unwrap();

        assert_eq!(report.export_summary.total_files_exported, 1);
        assert!(base_dir
            .path()
            .join("CodebaseExport_Flat/src_Foo.cs")
            .exists());
    }

    #[test]
    fn test_config_snapshot_creation() {
        let config = Config::default();
        let app = CodeExport::new_for_test(config, OutputMode::Human, 0, true);

        let snapshot = app.create_config_snapshot();
        assert_eq!(snapshot.extensions, vec!["cs".to_string()]);
        assert_eq!(snapshot.layout, LayoutMode::Nested);
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        CodeExport::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[filters]"));
        assert!(content.contains("[output]"));
    }

    #[test]
    fn test_shutdown_handling() {
        let config = Config::default();
        let app = CodeExport::new_for_test(config, OutputMode::Human, 0, true);

        assert!(app.is_running());

        app.request_shutdown();
        assert!(!app.is_running());
    }
}
