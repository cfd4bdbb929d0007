use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the configuration file looked up next to the checked source.
pub const CONFIG_FILE_NAME: &str = "Pseudocheck.toml";

/// The parsed Pseudocheck.toml configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PseudocheckConfig {
    #[serde(default)]
    pub checker: CheckerSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckerSection {
    /// Number of spaces per indentation level.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

impl Default for CheckerSection {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputSection {
    /// Treat warnings as failures when deciding the exit status.
    #[serde(default)]
    pub deny_warnings: bool,
}

fn default_indent_width() -> usize {
    3
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read Pseudocheck.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid Pseudocheck.toml: {0}")]
    ParseError(String),
    #[error("invalid Pseudocheck.toml: [checker] indent_width must be at least 1, got {0}")]
    InvalidIndentWidth(usize),
}

/// Walk up from `start_dir` looking for `Pseudocheck.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate a configuration file from a path.
pub fn load_config(path: &Path) -> Result<PseudocheckConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate a configuration from a string.
pub fn parse_config(content: &str) -> Result<PseudocheckConfig, ConfigError> {
    let config: PseudocheckConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    if config.checker.indent_width == 0 {
        return Err(ConfigError::InvalidIndentWidth(0));
    }
    Ok(config)
}

/// Find the configuration for a source file, falling back to defaults
/// when no file exists anywhere above it.
pub fn find_and_load_config(source_file: &Path) -> Result<PseudocheckConfig, ConfigError> {
    let start_dir = source_file.parent().unwrap_or_else(|| Path::new("."));
    match find_config(start_dir) {
        Some(path) => load_config(&path),
        None => Ok(PseudocheckConfig::default()),
    }
}
