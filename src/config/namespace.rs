//! Hierarchical key/value namespaces.

use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::{Table, Value};

use super::script::{self, LoadOptions};
use super::source::SourceResolver;
use super::ConfigError;

/// A single entry in a [`Namespace`]: either a value or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Value(Value),
    Group(Namespace),
}

impl Setting {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Setting::Value(value) => Some(value),
            Setting::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Namespace> {
        match self {
            Setting::Group(group) => Some(group),
            Setting::Value(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Setting::Group(_))
    }

    /// Converts the setting into a plain TOML value, turning groups into tables.
    pub fn to_value(&self) -> Value {
        match self {
            Setting::Value(value) => value.clone(),
            Setting::Group(group) => Value::Table(group.to_table()),
        }
    }
}

/// An ordered set of settings with nested sub-namespaces.
///
/// Keys are unique within one namespace. Setting an existing key replaces its
/// value in place, so iteration follows first-insertion order.
///
/// ## Example
///
/// ```
/// use dragon_settings::Namespace;
///
/// let mut config = Namespace::new();
/// config.set("env", "dev");
/// config.group("db", |db| {
///     db.set("host", "localhost");
///     Ok(())
/// })?;
///
/// assert_eq!(config.value("db.host")?.as_str(), Some("localhost"));
/// assert!(config.value("db.port").is_err());
/// # Ok::<(), dragon_settings::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    entries: Vec<(String, Setting)>,
}

impl Namespace {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn insert(&mut self, key: String, setting: Setting) -> Option<Setting> {
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, setting)),
            None => {
                self.entries.push((key, setting));
                None
            }
        }
    }

    /// Stores `value` under `key`, replacing whatever was there before.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.insert(key.into(), Setting::Value(value.into()));
    }

    /// Stores any serializable value under `key`.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), ConfigError> {
        let value = Value::try_from(value)?;
        self.insert(key.into(), Setting::Value(value));
        Ok(())
    }

    /// Removes `key` and returns the setting it held.
    ///
    /// Fails with [`ConfigError::KeyNotFound`] if the key is absent.
    pub fn unset(&mut self, key: &str) -> Result<Setting, ConfigError> {
        let idx = self
            .position(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        Ok(self.entries.remove(idx).1)
    }

    /// Returns true if `key` is present at this level, as a value or a group.
    pub fn exists(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Result<&Setting, ConfigError> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, setting)| setting)
            .ok_or_else(|| ConfigError::UndefinedVariable(key.to_string()))
    }

    /// Returns the sub-namespace `name`, creating an empty one if absent.
    pub fn group_mut(&mut self, name: &str) -> Result<&mut Namespace, ConfigError> {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.entries
                    .push((name.to_string(), Setting::Group(Namespace::new())));
                self.entries.len() - 1
            }
        };

        match &mut self.entries[idx].1 {
            Setting::Group(group) => Ok(group),
            Setting::Value(_) => Err(ConfigError::NotAGroup(name.to_string())),
        }
    }

    /// Runs `body` against the sub-namespace `name`.
    ///
    /// Calling this again with the same name extends the existing group rather
    /// than replacing it.
    pub fn group<F>(&mut self, name: &str, body: F) -> Result<&mut Namespace, ConfigError>
    where
        F: FnOnce(&mut Namespace) -> Result<(), ConfigError>,
    {
        let group = self.group_mut(name)?;
        body(&mut *group)?;
        Ok(group)
    }

    /// Loads a config script into this namespace.
    ///
    /// Missing sources are skipped when `options.if_exists` is set and fail with
    /// [`ConfigError::SourceNotFound`] otherwise. Operations apply in order and
    /// are not rolled back if a later one fails.
    pub fn load(
        &mut self,
        location: &str,
        options: LoadOptions,
        resolver: &dyn SourceResolver,
    ) -> Result<(), ConfigError> {
        script::load_into(self, location, options, resolver, &mut Vec::new())
    }

    /// Resolves a dotted path such as `db.host`.
    pub fn lookup(&self, path: &str) -> Result<&Setting, ConfigError> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::UndefinedVariable(path.to_string()));
        }

        let mut current = self;
        for (depth, part) in parts[..parts.len() - 1].iter().enumerate() {
            current = match current.get(part) {
                Ok(Setting::Group(group)) => group,
                Ok(Setting::Value(_)) => {
                    return Err(ConfigError::NotAGroup(parts[..=depth].join(".")));
                }
                Err(_) => return Err(ConfigError::UndefinedVariable(path.to_string())),
            };
        }

        let last = parts[parts.len() - 1];
        current
            .get(last)
            .map_err(|_| ConfigError::UndefinedVariable(path.to_string()))
    }

    /// Resolves a dotted path that must hold a value rather than a group.
    pub fn value(&self, path: &str) -> Result<&Value, ConfigError> {
        self.lookup(path)?
            .as_value()
            .ok_or_else(|| ConfigError::NotAValue(path.to_string()))
    }

    /// Resolves a dotted path and deserializes it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        self.lookup(path)?
            .to_value()
            .try_into()
            .map_err(ConfigError::Deserialize)
    }

    /// Deserializes the whole namespace into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Value::Table(self.to_table())
            .try_into()
            .map_err(ConfigError::Deserialize)
    }

    pub fn to_table(&self) -> Table {
        self.entries
            .iter()
            .map(|(key, setting)| (key.clone(), setting.to_value()))
            .collect()
    }

    /// Merges a TOML table into this namespace.
    ///
    /// Tables extend the group of the same name; every other value replaces
    /// whatever was stored under its key.
    pub fn merge_table(&mut self, table: Table) -> Result<(), ConfigError> {
        for (key, value) in table {
            match value {
                Value::Table(nested) => self.group_mut(&key)?.merge_table(nested)?,
                value => self.set(key, value),
            }
        }
        Ok(())
    }

    /// Sets `value` at a nested path, creating intermediate groups.
    pub(crate) fn set_at_path(
        &mut self,
        path: &[String],
        value: Value,
    ) -> Result<(), ConfigError> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };

        let mut current = self;
        for part in parents {
            current = current.group_mut(part)?;
        }
        current.set(last.clone(), value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Setting)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
