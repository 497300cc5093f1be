use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to prepare output directory {path}")]
    Setup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Root path is not an existing directory: {path}")]
    InvalidRoot { path: String },

    #[error("No source files found under the root directory")]
    NoSourcesFound { searched_extensions: Vec<String> },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ExportError {
    fn user_message(&self) -> String {
        match self {
            ExportError::Setup { path, source } => {
                format!("Could not reset output directory {}: {}", path, source)
            }
            ExportError::InvalidRoot { path } => {
                format!("Root path is not an existing directory: {}", path)
            }
            ExportError::NoSourcesFound {
                searched_extensions,
            } => {
                format!(
                    "No source files found with extensions: {}",
                    searched_extensions.join(", ")
                )
            }
            ExportError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            ExportError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            ExportError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExportError::Setup { .. } => Some(
                "Close any programs holding files open under the output directory and ensure you have write permission for its parent.".to_string()
            ),
            ExportError::InvalidRoot { .. } => Some(
                "Pass the path of an existing project directory as the first argument.".to_string()
            ),
            ExportError::NoSourcesFound { .. } => Some(
                "Try different file extensions with --formats (e.g. --formats cs,fs) or check that the directory contains source files.".to_string()
            ),
            ExportError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            ExportError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(error: toml::de::Error) -> Self {
        ExportError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
