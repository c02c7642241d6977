//! Application context exposing one named configuration to application code.

use crate::config::{Namespace, Registry};
use crate::Error;

/// Central application context holding the configuration registry.
///
/// The context owns the [`Registry`] once loading is finished and hands out
/// read-only access to the configuration the application was built for.
///
/// ## Example
///
/// ```no_run
/// use dragon_settings::{AppContext, FileResolver, Loader, Registry};
///
/// let mut registry = Registry::new();
/// Loader::new(FileResolver::with_base("config"))
///     .with_script("default.conf", true)
///     .with_script("local.conf", false)
///     .load(&mut registry, "app")?;
///
/// let ctx = AppContext::builder("app").with_registry(registry).build()?;
/// let port = ctx.config().get_as::<u16>("server.port")?;
/// # Ok::<(), dragon_settings::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext {
    registry: Registry,
    name: String,
    // Registry entries are never removed, and the context never mutates it.
    index: usize,
}

impl AppContext {
    /// Creates a builder for a context serving the configuration `name`.
    pub fn builder(name: impl Into<String>) -> AppContextBuilder {
        AppContextBuilder {
            name: name.into(),
            registry: None,
        }
    }

    /// Returns the application's configuration.
    pub fn config(&self) -> &Namespace {
        self.registry.at(self.index)
    }

    pub fn config_name(&self) -> &str {
        &self.name
    }

    /// Returns the full registry, for code that needs other named configurations.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Builder for constructing an [`AppContext`].
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    name: String,
    registry: Option<Registry>,
}

impl AppContextBuilder {
    /// Attaches the registry the configuration was loaded into.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the `AppContext`.
    ///
    /// Returns an error if no registry was provided or it has no configuration
    /// under the requested name.
    pub fn build(self) -> Result<AppContext, Error> {
        let registry = self.registry.ok_or(Error::MissingRegistry)?;
        let index = registry
            .position(&self.name)
            .ok_or_else(|| Error::MissingConfig(self.name.clone()))?;

        Ok(AppContext {
            registry,
            name: self.name,
            index,
        })
    }
}
