use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::exporter::LayoutMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codexport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export source files from a project tree")]
#[command(
    long_about = "Codexport walks a project directory, collects source files, and copies \
                       them into an export directory with a banner header recording each \
                       file's original name and location."
)]
#[command(after_help = "EXAMPLES:\n  \
    codexport ~/projects/MyApp\n  \
    codexport ~/projects/MyApp --layout flat\n  \
    codexport ~/projects/MyApp --formats cs,fs --exclude Generated --verbose\n  \
    codexport ~/projects/MyApp --output-base /tmp/exports --config my-config.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory to export from
    #[arg(value_parser = validate_root_dir)]
    pub root: PathBuf,

    /// Export layout (nested preserves the tree, flat encodes it into names)
    #[arg(short, long, value_enum)]
    pub layout: Option<LayoutChoice>,

    /// Base directory that receives the export folder
    #[arg(short, long, help = "Directory under which CodebaseExport[_Flat] is created")]
    pub output_base: Option<PathBuf>,

    /// File formats to export (comma-separated)
    #[arg(short, long, help = "File extensions to export (e.g., cs,fs,vb)")]
    pub formats: Option<String>,

    /// Directories to exclude from the walk
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum file size in MB
    #[arg(long, help = "Maximum file size to process (in MB)")]
    pub max_size: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Skip writing report files into the export directory
    #[arg(long, help = "Do not write report files under .codexport/")]
    pub no_report: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be exported without actually doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,

    /// Wait for Enter before the process exits
    #[arg(long, help = "Pause for a keypress after the run finishes")]
    pub pause: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutChoice {
    /// Preserve the original folder structure
    Nested,
    /// All files in one folder, paths encoded into names
    Flat,
}

impl From<LayoutChoice> for LayoutMode {
    fn from(choice: LayoutChoice) -> Self {
        match choice {
            LayoutChoice::Nested => LayoutMode::Nested,
            LayoutChoice::Flat => LayoutMode::Flat,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // Convert MB to bytes

        let generate_report = if self.no_report { Some(false) } else { None };

        CliOverrides::new()
            .with_formats(self.formats.clone())
            .with_exclude(self.exclude.clone())
            .with_max_file_size(max_file_size)
            .with_base_directory(self.output_base.clone())
            .with_layout(self.layout.map(LayoutMode::from))
            .with_generate_report(generate_report)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn validate_root_dir(s: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }

    if !path.is_dir() {
        return Err(format!("Not a directory: {}", s));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_for(root: PathBuf) -> Cli {
        Cli {
            root,
            layout: None,
            output_base: None,
            formats: None,
            exclude: None,
            max_size: None,
            config: None,
            output_format: OutputFormat::Human,
            no_report: false,
            verbose: 0,
            quiet: false,
            dry_run: false,
            generate_config: false,
            pause: false,
        }
    }

    #[test]
    fn test_validate_root_dir() {
        let temp_dir = TempDir::new().unwrap();

        let valid = validate_root_dir(temp_dir.path().to_str().unwrap());
        assert!(valid.is_ok());

        assert!(validate_root_dir("/definitely/not/a/real/path").is_err());

        let file_path = temp_dir.path().join("file.cs");
        std::fs::write(&file_path, "class C{}").unwrap();
        assert!(validate_root_dir(file_path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_layout_choice_mapping() {
        assert_eq!(LayoutMode::from(LayoutChoice::Nested), LayoutMode::Nested);
        assert_eq!(LayoutMode::from(LayoutChoice::Flat), LayoutMode::Flat);
    }

    #[test]
    fn test_cli_overrides_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli_for(temp_dir.path().to_path_buf());
        cli.formats = Some("cs,fs".to_string());
        cli.max_size = Some(5);
        cli.layout = Some(LayoutChoice::Flat);
        cli.no_report = true;

        let overrides = cli.create_cli_overrides();

        assert_eq!(overrides.formats.as_deref(), Some("cs,fs"));
        assert_eq!(overrides.max_file_size, Some(5 * 1024 * 1024));
        assert_eq!(overrides.layout, Some(LayoutMode::Flat));
        assert_eq!(overrides.generate_report, Some(false));
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli_for(temp_dir.path().to_path_buf());
        cli.layout = Some(LayoutChoice::Flat);
        cli.output_base = Some(temp_dir.path().to_path_buf());

        let config = cli.load_config().unwrap();

        assert_eq!(config.output.layout, LayoutMode::Flat);
        assert_eq!(config.output.base_directory, temp_dir.path());
    }

    #[test]
    fn test_verbosity_level() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = cli_for(temp_dir.path().to_path_buf());

        cli.verbose = 2;
        assert_eq!(cli.verbosity_level(), 2);

        cli.quiet = true;
        assert_eq!(cli.verbosity_level(), 0);
    }
}
