use crate::error::{ExportError, Result};
use crate::exporter::LayoutMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub layout: LayoutMode,
    pub generate_report: bool,
    pub base_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filters: FilterConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["cs".to_string()],
            max_file_size: 10 * 1024 * 1024, // 10MB
            exclude_dirs: vec![],
            exclude_patterns: vec![],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Nested,
            generate_report: true,
            base_directory: default_base_directory(),
        }
    }
}

/// The desktop folder when one exists, otherwise the working directory.
fn default_base_directory() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from);

    if let Some(home) = home {
        let desktop = home.join("Desktop");
        if desktop.is_dir() {
            return desktop;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExportError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExportError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ExportError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["codexport.toml", "codexport.config.toml", ".codexport.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref formats) = cli_args.formats {
            self.filters.extensions = formats
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.filters.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.filters.max_file_size = max_size;
        }

        if let Some(ref base_directory) = cli_args.base_directory {
            self.output.base_directory = base_directory.clone();
        }

        if let Some(layout) = cli_args.layout {
            self.output.layout = layout;
        }

        if let Some(generate_report) = cli_args.generate_report {
            self.output.generate_report = generate_report;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ExportError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ExportError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.extensions.is_empty() {
            return Err(ExportError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.filters.max_file_size == 0 {
            return Err(ExportError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if let Some(parent) = self.output.base_directory.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ExportError::Config {
                    message: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub formats: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub base_directory: Option<PathBuf>,
    pub layout: Option<LayoutMode>,
    pub generate_report: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: Option<String>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_base_directory(mut self, base_directory: Option<PathBuf>) -> Self {
        self.base_directory = base_directory;
        self
    }

    pub fn with_layout(mut self, layout: Option<LayoutMode>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_generate_report(mut self, generate_report: Option<bool>) -> Self {
        self.generate_report = generate_report;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filters.extensions, vec!["cs".to_string()]);
        assert_eq!(config.output.layout, LayoutMode::Nested);
        assert!(config.output.generate_report);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.filters.extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.filters.extensions, loaded_config.filters.extensions);
        assert_eq!(config.output.layout, loaded_config.output.layout);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_formats(Some("cs,fs".to_string()))
            .with_layout(Some(LayoutMode::Flat))
            .with_max_file_size(Some(2048));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.filters.extensions, vec!["cs", "fs"]);
        assert_eq!(config.output.layout, LayoutMode::Flat);
        assert_eq!(config.filters.max_file_size, 2048);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[output]"));
    }
}
