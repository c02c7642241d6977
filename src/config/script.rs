//! Declarative config scripts.
//!
//! A script is a sequence of operations applied to a current namespace:
//!
//! ```text
//! set(env, "dev")
//! group(db) {
//!     set(host, "localhost")
//!     set(port, 5432)
//! }
//! unset(env)
//! load("local.conf", if_exists = true)
//! ```
//!
//! A script is parsed in full before anything is applied, so a syntax error
//! leaves the namespace untouched. Operations then apply one at a time; if one
//! fails, the ones before it stay applied.

use toml::Value;
use tracing::{debug, trace};

use super::namespace::Namespace;
use super::parser;
use super::source::SourceResolver;
use super::ConfigError;

/// Options accepted by `load`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip the source silently when it does not exist.
    pub if_exists: bool,
}

impl LoadOptions {
    pub fn required() -> Self {
        Self { if_exists: false }
    }

    pub fn if_exists() -> Self {
        Self { if_exists: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Set { key: String, value: Value },
    Unset { key: String },
    Group { name: String, body: Vec<Statement> },
    Load { location: String, options: LoadOptions },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub op: Op,
    pub line: usize,
}

/// A parsed config script, ready to be applied to a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    location: String,
    statements: Vec<Statement>,
}

impl Script {
    /// Parses `input`; `location` names the source in error messages.
    pub fn parse(location: impl Into<String>, input: &str) -> Result<Self, ConfigError> {
        let location = location.into();
        match parser::parse(input) {
            Ok(statements) => Ok(Self {
                location,
                statements,
            }),
            Err(e) => Err(ConfigError::Syntax {
                location,
                line: e.line,
                column: e.column,
                message: e.message,
            }),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Applies the script to `namespace`, resolving nested loads through `resolver`.
    pub fn apply(
        &self,
        namespace: &mut Namespace,
        resolver: &dyn SourceResolver,
    ) -> Result<(), ConfigError> {
        let mut stack = vec![self.location.clone()];
        execute(&self.location, &self.statements, namespace, resolver, &mut stack)
    }
}

/// Loads `location` into `namespace`.
///
/// `stack` holds the sources currently being applied and is used to reject
/// a source that loads itself.
pub(crate) fn load_into(
    namespace: &mut Namespace,
    location: &str,
    options: LoadOptions,
    resolver: &dyn SourceResolver,
    stack: &mut Vec<String>,
) -> Result<(), ConfigError> {
    if stack.iter().any(|loading| loading == location) {
        return Err(ConfigError::CircularLoad(location.to_string()));
    }

    if !resolver.exists(location) {
        if options.if_exists {
            debug!(source = location, "skipping missing optional config source");
            return Ok(());
        }
        return Err(ConfigError::SourceNotFound(location.to_string()));
    }

    debug!(source = location, "loading config source");
    let contents = resolver.read(location)?;
    let script = Script::parse(location, &contents)?;

    stack.push(location.to_string());
    let result = execute(location, &script.statements, namespace, resolver, stack);
    stack.pop();
    result
}

fn execute(
    location: &str,
    statements: &[Statement],
    namespace: &mut Namespace,
    resolver: &dyn SourceResolver,
    stack: &mut Vec<String>,
) -> Result<(), ConfigError> {
    for statement in statements {
        trace!(source = location, line = statement.line, op = ?statement.op, "applying");

        let result = match &statement.op {
            Op::Set { key, value } => {
                namespace.set(key.clone(), value.clone());
                Ok(())
            }
            Op::Unset { key } => namespace.unset(key).map(drop),
            Op::Group { name, body } => namespace
                .group_mut(name)
                .and_then(|group| execute(location, body, group, resolver, stack)),
            Op::Load {
                location: target,
                options,
            } => load_into(namespace, target, *options, resolver, stack),
        };

        result.map_err(|e| in_script(location, statement.line, e))?;
    }

    Ok(())
}

fn in_script(location: &str, line: usize, error: ConfigError) -> ConfigError {
    // Already positioned by a statement nested in a group of this source.
    if let ConfigError::Script { location: inner, .. } = &error {
        if inner == location {
            return error;
        }
    }

    ConfigError::Script {
        location: location.to_string(),
        line,
        source: Box::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::MemoryResolver;

    fn resolver() -> MemoryResolver {
        MemoryResolver::new()
            .with_source("a.conf", r#"set(env, "dev")"#)
            .with_source("b.conf", r#"set(env, "prod")"#)
            .with_source(
                "main.conf",
                r#"
                load("a.conf")
                load("b.conf")
                load("missing.conf", if_exists = true)
                "#,
            )
            .with_source("self.conf", r#"load("self.conf")"#)
            .with_source("ping.conf", r#"load("pong.conf")"#)
            .with_source("pong.conf", r#"load("ping.conf")"#)
            .with_source(
                "partial.conf",
                "set(a, 1)\ngroup(db) {\n  set(host, \"x\")\n  unset(port)\n  set(b, 2)\n}\nset(c, 3)",
            )
            .with_source("broken.conf", "set(a, 1)\nset(b, ")
            .with_source("nested-missing.conf", r#"set(a, 1) load("nowhere.conf")"#)
    }

    #[test]
    fn test_later_source_wins() {
        let mut ns = Namespace::new();
        ns.load("main.conf", LoadOptions::required(), &resolver())
            .unwrap();

        assert_eq!(ns.value("env").unwrap().as_str(), Some("prod"));
    }

    #[test]
    fn test_missing_source() {
        let mut ns = Namespace::new();
        ns.load("nope.conf", LoadOptions::if_exists(), &resolver())
            .unwrap();
        assert!(ns.is_empty());

        let result = ns.load("nope.conf", LoadOptions::required(), &resolver());
        assert!(matches!(result, Err(ConfigError::SourceNotFound(ref l)) if l == "nope.conf"));
    }

    #[test]
    fn test_runtime_error_keeps_applied_operations() {
        let mut ns = Namespace::new();
        let err = ns
            .load("partial.conf", LoadOptions::required(), &resolver())
            .unwrap_err();

        match &err {
            ConfigError::Script {
                location,
                line,
                source,
            } => {
                assert_eq!(location, "partial.conf");
                assert_eq!(*line, 4);
                assert!(matches!(**source, ConfigError::KeyNotFound(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(ns.exists("a"));
        assert_eq!(ns.value("db.host").unwrap().as_str(), Some("x"));
        assert!(ns.lookup("db.b").is_err());
        assert!(!ns.exists("c"));
    }

    #[test]
    fn test_syntax_error_applies_nothing() {
        let mut ns = Namespace::new();
        let err = ns
            .load("broken.conf", LoadOptions::required(), &resolver())
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Syntax { ref location, line: 2, .. } if location == "broken.conf"
        ));
        assert!(ns.is_empty());
    }

    #[test]
    fn test_nested_missing_load() {
        let mut ns = Namespace::new();
        let err = ns
            .load("nested-missing.conf", LoadOptions::required(), &resolver())
            .unwrap_err();

        assert!(matches!(err.root_cause(), ConfigError::SourceNotFound(_)));
        assert!(ns.exists("a"));
    }

    #[test]
    fn test_circular_load() {
        let mut ns = Namespace::new();

        let err = ns
            .load("self.conf", LoadOptions::required(), &resolver())
            .unwrap_err();
        assert!(matches!(err.root_cause(), ConfigError::CircularLoad(_)));

        let err = ns
            .load("ping.conf", LoadOptions::required(), &resolver())
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ConfigError::CircularLoad(ref l) if l == "ping.conf"
        ));
    }

    #[test]
    fn test_same_source_loaded_twice_in_sequence() {
        let mut ns = Namespace::new();
        let resolver = resolver();
        ns.load("a.conf", LoadOptions::required(), &resolver).unwrap();
        ns.load("a.conf", LoadOptions::required(), &resolver).unwrap();

        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_apply_parsed_script() {
        let script = Script::parse(
            "<inline>",
            r#"
            group(db) { set(host, "localhost") }
            group(db) { set(port, 5432) }
            "#,
        )
        .unwrap();
        assert_eq!(script.statements().len(), 2);

        let mut ns = Namespace::new();
        script.apply(&mut ns, &MemoryResolver::new()).unwrap();

        assert_eq!(ns.value("db.host").unwrap().as_str(), Some("localhost"));
        assert_eq!(ns.value("db.port").unwrap().as_integer(), Some(5432));
    }
}
