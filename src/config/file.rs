//! File-based config sources.

use std::path::{Path, PathBuf};

use super::source::SourceResolver;
use super::ConfigError;

/// Resolves config sources on the filesystem.
///
/// Relative locations are resolved against the base directory when one is
/// set, and against the working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    base: Option<PathBuf>,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl AsRef<Path>) -> Self {
        Self {
            base: Some(base.as_ref().to_path_buf()),
        }
    }

    pub fn path_for(&self, location: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(location),
            None => PathBuf::from(location),
        }
    }
}

impl SourceResolver for FileResolver {
    fn exists(&self, location: &str) -> bool {
        self.path_for(location).is_file()
    }

    fn read(&self, location: &str) -> Result<String, ConfigError> {
        let path = self.path_for(location);
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::SourceNotFound(location.to_string())
            } else {
                ConfigError::Read { path, source: e }
            }
        })
    }
}

/// Loads and parses a TOML config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
pub(crate) fn load_toml_file(
    path: &Path,
    required: bool,
) -> Result<Option<toml::Table>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| ConfigError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::SourceNotFound(path.display().to_string()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
