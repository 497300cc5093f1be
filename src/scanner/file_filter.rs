use crate::config::FilterConfig;
use regex::Regex;
use std::path::{Component, Path};

/// Directory names whose contents are build output, never source.
/// Matched against whole path components, not substrings, so a directory
/// named `binary` passes and a *file* named `bin` passes.
const EXCLUDED_DIR_SEGMENTS: &[&str] = &["bin", "obj"];

pub struct SourceFilter {
    extensions: Vec<String>,
    max_file_size: u64,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl SourceFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extensions: config.extensions.clone(),
            max_file_size: config.max_file_size,
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        }
    }

    /// Pure eligibility predicate over a root-relative path.
    ///
    /// A file qualifies when it carries a configured source extension and
    /// none of the rejection rules hold: a `bin`/`obj` directory component,
    /// or a generated-file name (`*.Designer.<ext>`, `*.g.<ext>`,
    /// `*AssemblyInfo.<ext>`).
    pub fn is_eligible(&self, relative_path: &Path) -> bool {
        if !self.has_configured_extension(relative_path) {
            return false;
        }

        if self.in_excluded_segment(relative_path) {
            return false;
        }

        if let Some(stem) = relative_path.file_stem().and_then(|s| s.to_str()) {
            if is_generated_stem(stem) {
                return false;
            }
        }

        true
    }

    fn has_configured_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(extension) => self.extensions.contains(&extension.to_lowercase()),
            None => false,
        }
    }

    /// True when any *directory* component is literally `bin` or `obj`.
    fn in_excluded_segment(&self, relative_path: &Path) -> bool {
        let mut components = relative_path.components().peekable();

        while let Some(component) = components.next() {
            // The last component is the file name, not a directory.
            if components.peek().is_none() {
                break;
            }

            if let Component::Normal(name) = component {
                if let Some(name) = name.to_str() {
                    if EXCLUDED_DIR_SEGMENTS.contains(&name) {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Traversal predicate for directory pruning during the walk.
    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            if EXCLUDED_DIR_SEGMENTS.contains(&dir_name) {
                return false;
            }

            if self.exclude_dirs.iter().any(|exclude| exclude == dir_name) {
                return false;
            }

            let path_str = path.to_string_lossy();
            for pattern in &self.exclude_patterns {
                if pattern.is_match(&path_str) {
                    return false;
                }
            }
        }

        true
    }

    pub fn is_size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_size
    }

    pub fn extensions(&self) -> &Vec<String> {
        &self.extensions
    }
}

/// Generated-file detection on the file stem (name minus final extension),
/// case-insensitive: `Widget.Designer`, `App.g`, `AssemblyInfo`,
/// `MyAssemblyInfo` all match.
fn is_generated_stem(stem: &str) -> bool {
    let stem = stem.to_lowercase();

    stem.ends_with(".designer") || stem.ends_with(".g") || stem.ends_with("assemblyinfo")
}

impl Default for SourceFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
