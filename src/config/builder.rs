use std::path::{Path, PathBuf};

use tracing::debug;

use super::env::EnvSource;
use super::file::{load_toml_file, FileResolver};
use super::namespace::Namespace;
use super::registry::Registry;
use super::script::{load_into, LoadOptions};
use super::source::SourceResolver;
use super::ConfigError;

/// A source in the loading pipeline.
#[derive(Debug)]
enum LoadSource {
    Script { location: String, required: bool },
    Toml { path: PathBuf, required: bool },
    Env(EnvSource),
}

/// Applies an ordered list of config sources to a namespace.
///
/// Sources are applied in registration order, so later sources override
/// earlier ones. Groups are extended rather than replaced, while every other
/// value is replaced entirely.
///
/// ## Example
///
/// ```no_run
/// use dragon_settings::{FileResolver, Loader, Registry};
///
/// let mut registry = Registry::new();
/// let app = Loader::new(FileResolver::with_base("config"))
///     .with_script("production.conf", true)
///     .with_script("local.conf", false)
///     .with_env("MYAPP", "__")
///     .load(&mut registry, "app")?;
///
/// let host = app.value("database.host")?;
/// # Ok::<(), dragon_settings::ConfigError>(())
/// ```
#[derive(Debug)]
#[must_use = "loaders do nothing until .load() is called"]
pub struct Loader {
    resolver: Box<dyn SourceResolver>,
    sources: Vec<LoadSource>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(FileResolver::new())
    }
}

impl Loader {
    /// Creates a loader that reads scripts through `resolver`.
    pub fn new(resolver: impl SourceResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            sources: Vec::new(),
        }
    }

    /// Adds a config script.
    ///
    /// If `required` is `true`, loading fails when the script doesn't exist.
    /// Optional scripts that are missing are silently skipped.
    pub fn with_script(mut self, location: impl Into<String>, required: bool) -> Self {
        self.sources.push(LoadSource::Script {
            location: location.into(),
            required,
        });
        self
    }

    /// Adds a TOML file. Tables in the file extend the group of the same name.
    pub fn with_toml_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(LoadSource::Toml {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Overlays environment variables with the given prefix.
    ///
    /// A variable whose path runs through an existing value, such as
    /// `MYAPP__DATABASE__HOST` when `database` is a plain string, is skipped
    /// and logged at debug level.
    ///
    /// ```no_run
    /// # use dragon_settings::Loader;
    /// # let mut namespace = dragon_settings::Namespace::new();
    /// // defaults -> env overrides -> local script overrides env
    /// Loader::default()
    ///     .with_script("config/default.conf", true)
    ///     .with_env("MYAPP", "__")
    ///     .with_script("config/local.conf", false)
    ///     .load_into(&mut namespace)?;
    /// # Ok::<(), dragon_settings::ConfigError>(())
    /// ```
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.sources.push(LoadSource::Env(EnvSource::new(prefix, separator)));
        self
    }

    /// Applies every source to `namespace`, in registration order.
    ///
    /// Stops at the first failing source; sources applied before it stay applied.
    pub fn load_into(self, namespace: &mut Namespace) -> Result<(), ConfigError> {
        for source in self.sources {
            match source {
                LoadSource::Script { location, required } => {
                    let options = LoadOptions {
                        if_exists: !required,
                    };
                    let resolver = self.resolver.as_ref();
                    load_into(namespace, &location, options, resolver, &mut Vec::new())?;
                }
                LoadSource::Toml { path, required } => {
                    if let Some(table) = load_toml_file(&path, required)? {
                        debug!(path = %path.display(), "merging TOML config file");
                        namespace.merge_table(table)?;
                    }
                }
                LoadSource::Env(env) => env.apply(namespace)?,
            }
        }

        Ok(())
    }

    /// Applies every source to the configuration `name` in `registry`.
    pub fn load<'a>(
        self,
        registry: &'a mut Registry,
        name: &str,
    ) -> Result<&'a mut Namespace, ConfigError> {
        let config = registry.config(name);
        self.load_into(&mut *config)?;
        Ok(config)
    }
}
