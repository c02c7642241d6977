use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("undefined setting: {0}")]
    UndefinedVariable(String),

    #[error("cannot unset '{0}': key not found")]
    KeyNotFound(String),

    #[error("'{0}' holds a value, not a group")]
    NotAGroup(String),

    #[error("'{0}' is a group, not a value")]
    NotAValue(String),

    #[error("config source not found: {0}")]
    SourceNotFound(String),

    #[error("failed to read config source '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML file '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("syntax error in '{location}' at {line}:{column}: {message}")]
    Syntax {
        location: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("error in '{location}' at line {line}: {source}")]
    Script {
        location: String,
        line: usize,
        source: Box<ConfigError>,
    },

    #[error("circular load detected: {0}")]
    CircularLoad(String),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Returns the innermost error, looking through script execution wrappers.
    pub fn root_cause(&self) -> &ConfigError {
        match self {
            ConfigError::Script { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
