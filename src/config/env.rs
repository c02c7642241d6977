//! Environment variable overlays.

use toml::Value;
use tracing::debug;

use super::namespace::Namespace;
use super::ConfigError;

/// Maps prefixed environment variables onto settings.
///
/// `MYAPP__DATABASE__HOST=db` with prefix `MYAPP` and separator `__` becomes
/// `database.host = "db"`: intermediate segments name groups, and every
/// segment is lowercased.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    /// Applies the current process environment to `namespace`.
    pub fn apply(&self, namespace: &mut Namespace) -> Result<(), ConfigError> {
        self.apply_vars(namespace, std::env::vars())
    }

    pub(crate) fn apply_vars(
        &self,
        namespace: &mut Namespace,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);

        // Sorted so overlapping variables apply in a stable order.
        let mut matched: Vec<(Vec<String>, String)> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let path_str = key.strip_prefix(&prefix_with_sep)?;
                if path_str.is_empty() {
                    return None;
                }
                let path = path_str
                    .split(&self.separator)
                    .map(|s| s.to_lowercase())
                    .collect::<Vec<_>>();
                if path.iter().any(|segment| segment.is_empty()) {
                    return None;
                }
                Some((path, value))
            })
            .collect();
        matched.sort();

        for (path, value) in matched {
            let joined = path.join(".");
            match namespace.set_at_path(&path, coerce_value(&value)) {
                Ok(()) => debug!(path = %joined, "applied environment override"),
                Err(ConfigError::NotAGroup(segment)) => {
                    debug!(
                        path = %joined,
                        value_at = %segment,
                        "skipping environment override below a value"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
