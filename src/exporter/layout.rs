use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Character substituted for path separators when flattening.
pub const FLAT_SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Preserve the original directory tree under the output root.
    Nested,
    /// Place all files directly under the output root, encoding the
    /// original path into the file name.
    Flat,
}

impl LayoutMode {
    pub fn export_dir_name(&self) -> &'static str {
        match self {
            LayoutMode::Nested => "CodebaseExport",
            LayoutMode::Flat => "CodebaseExport_Flat",
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutMode::Nested => write!(f, "nested"),
            LayoutMode::Flat => write!(f, "flat"),
        }
    }
}

/// Compute where a source file lands under the output root.
///
/// `relative_path` must not contain `..` components; the scanner guarantees
/// this, which keeps every destination strictly inside `output_base`.
pub fn destination(output_base: &Path, relative_path: &Path, mode: LayoutMode) -> PathBuf {
    match mode {
        LayoutMode::Nested => output_base.join(relative_path),
        LayoutMode::Flat => output_base.join(flatten(relative_path)),
    }
}

/// Encode a relative path into a single file name by joining its
/// components with the substitution character.
///
/// Two distinct relative paths can collide when original names already
/// contain the substitution character; callers accept last-writer-wins.
pub fn flatten(relative_path: &Path) -> String {
    let components: Vec<String> = relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    components.join(&FLAT_SEPARATOR.to_string())
}
