use std::collections::HashMap;

use super::ConfigError;

/// Locates and reads config sources on behalf of `load`.
///
/// `exists` backs the `if_exists` option; `read` is only called for sources
/// that exist.
pub trait SourceResolver: Send + Sync + std::fmt::Debug {
    fn exists(&self, location: &str) -> bool;

    fn read(&self, location: &str) -> Result<String, ConfigError>;
}

/// Serves config sources from memory, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    sources: HashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, location: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(location, contents);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, contents: impl Into<String>) {
        self.sources.insert(location.into(), contents.into());
    }
}

impl SourceResolver for MemoryResolver {
    fn exists(&self, location: &str) -> bool {
        self.sources.contains_key(location)
    }

    fn read(&self, location: &str) -> Result<String, ConfigError> {
        self.sources
            .get(location)
            .cloned()
            .ok_or_else(|| ConfigError::SourceNotFound(location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_resolver() {
        let resolver = MemoryResolver::new().with_source("app.conf", "set(a, 1)");

        assert!(resolver.exists("app.conf"));
        assert!(!resolver.exists("other.conf"));
        assert_eq!(resolver.read("app.conf").unwrap(), "set(a, 1)");
        assert!(matches!(
            resolver.read("other.conf"),
            Err(ConfigError::SourceNotFound(_))
        ));
    }
}
