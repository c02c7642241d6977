//! Named configuration registry.

use tracing::info;

use super::namespace::Namespace;
use super::ConfigError;

/// Maps configuration names to their root [`Namespace`].
///
/// Each name has at most one root namespace. It is created empty the first
/// time the name is requested, and every later request returns that same
/// namespace, so repeated [`configure`](Self::configure) calls accumulate
/// settings instead of replacing them.
///
/// ## Example
///
/// ```
/// use dragon_settings::Registry;
///
/// let mut registry = Registry::new();
/// registry.configure("app", |app| {
///     app.set("a", 1);
///     Ok(())
/// })?;
/// registry.configure("app", |app| {
///     app.set("b", 2);
///     Ok(())
/// })?;
///
/// let app = registry.get("app").unwrap();
/// assert!(app.exists("a") && app.exists("b"));
/// # Ok::<(), dragon_settings::ConfigError>(())
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    configs: Vec<(String, Namespace)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.configs.iter().position(|(n, _)| n == name)
    }

    pub(crate) fn at(&self, idx: usize) -> &Namespace {
        &self.configs[idx].1
    }

    /// Returns the root namespace for `name`, creating it on first use.
    pub fn config(&mut self, name: &str) -> &mut Namespace {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                info!(config = name, "registering configuration");
                self.configs.push((name.to_string(), Namespace::new()));
                self.configs.len() - 1
            }
        };
        &mut self.configs[idx].1
    }

    /// Runs `body` against the root namespace for `name` and returns it.
    pub fn configure<F>(&mut self, name: &str, body: F) -> Result<&mut Namespace, ConfigError>
    where
        F: FnOnce(&mut Namespace) -> Result<(), ConfigError>,
    {
        let config = self.config(name);
        body(&mut *config)?;
        Ok(config)
    }

    /// Returns the root namespace for `name` without creating it.
    pub fn get(&self, name: &str) -> Option<&Namespace> {
        self.position(name).map(|idx| self.at(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Drops every registered configuration.
    ///
    /// Intended for isolating test cases that share one registry.
    pub fn clear(&mut self) {
        self.configs.clear();
    }
}
