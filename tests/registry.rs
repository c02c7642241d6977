use std::fs;

use dragon_settings::{
    AppContext, ConfigError, FileResolver, LoadOptions, Loader, MemoryResolver, Namespace,
    Registry,
};
use serde::Deserialize;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

#[test]
fn set_get_exists_unset() {
    let mut ns = Namespace::new();
    assert!(!ns.exists("k"));

    ns.set("k", "v1");
    assert!(ns.exists("k"));
    ns.set("k", "v2");
    assert_eq!(ns.value("k").unwrap().as_str(), Some("v2"));

    let removed = ns.unset("k").unwrap();
    assert_eq!(removed.as_value().and_then(|v| v.as_str()), Some("v2"));
    assert!(!ns.exists("k"));
    assert!(matches!(ns.unset("k"), Err(ConfigError::KeyNotFound(_))));
}

#[test]
fn for_same_name_is_identical_and_accumulates() {
    let mut registry = Registry::new();
    let first: *const Namespace = registry
        .configure("app", |app| {
            app.set("a", 1);
            Ok(())
        })
        .unwrap();
    let second: *const Namespace = registry
        .configure("app", |app| {
            app.set("b", 2);
            Ok(())
        })
        .unwrap();

    assert!(std::ptr::eq(first, second));
    let app = registry.get("app").unwrap();
    assert_eq!(app.value("a").unwrap().as_integer(), Some(1));
    assert_eq!(app.value("b").unwrap().as_integer(), Some(2));
}

#[test]
fn sources_apply_in_order_from_disk() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.conf", r#"set(env, "dev")"#);
    write(&dir, "b.conf", r#"set(env, "prod")"#);

    let resolver = FileResolver::with_base(dir.path());
    let mut registry = Registry::new();
    let app = registry.config("app");
    app.load("a.conf", LoadOptions::required(), &resolver).unwrap();
    app.load("b.conf", LoadOptions::required(), &resolver).unwrap();

    assert_eq!(app.value("env").unwrap().as_str(), Some("prod"));
}

#[test]
fn missing_source_handling() {
    let dir = TempDir::new().unwrap();
    let resolver = FileResolver::with_base(dir.path());
    let mut ns = Namespace::new();

    ns.load("missing.conf", LoadOptions::if_exists(), &resolver)
        .unwrap();
    assert!(ns.is_empty());

    let result = ns.load("missing.conf", LoadOptions::required(), &resolver);
    assert!(matches!(result, Err(ConfigError::SourceNotFound(_))));
}

#[test]
fn exists_does_not_follow_dotted_paths() {
    let mut registry = Registry::new();
    let app = registry
        .configure("app", |app| {
            app.group("db", |db| {
                db.set("host", "localhost");
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    assert!(app.exists("db"));
    assert!(!app.exists("host"));
    assert!(!app.exists("db.host"));
}

#[test]
fn deeply_nested_script_is_rejected() {
    let depth = 100_000;
    let resolver = MemoryResolver::new().with_source(
        "deep.conf",
        format!("{}set(a, 1){}", "group(g) {\n".repeat(depth), "}\n".repeat(depth)),
    );

    let mut ns = Namespace::new();
    let result = ns.load("deep.conf", LoadOptions::required(), &resolver);

    assert!(matches!(result, Err(ConfigError::Syntax { .. })));
    assert!(ns.is_empty());
}

#[test]
fn group_lookup_and_undefined() {
    let resolver = MemoryResolver::new().with_source(
        "db.conf",
        r#"
        group(db) { set(host, "localhost") }
        "#,
    );

    let mut ns = Namespace::new();
    ns.load("db.conf", LoadOptions::required(), &resolver).unwrap();

    assert_eq!(ns.value("db.host").unwrap().as_str(), Some("localhost"));
    assert!(matches!(
        ns.value("db.port"),
        Err(ConfigError::UndefinedVariable(ref path)) if path == "db.port"
    ));
}

#[test]
fn nested_load_with_local_override() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "app.conf",
        r#"
        set(name, "dragon")
        group(server) {
            set(host, "0.0.0.0")
            set(port, 8080)
        }
        load("app.local.conf", if_exists = true)
        "#,
    );
    write(
        &dir,
        "app.local.conf",
        r#"
        group(server) { set(port, 3000) }
        unset(name)
        "#,
    );

    let resolver = FileResolver::with_base(dir.path());
    let mut ns = Namespace::new();
    ns.load("app.conf", LoadOptions::required(), &resolver)
        .unwrap();

    assert!(!ns.exists("name"));
    assert_eq!(ns.value("server.host").unwrap().as_str(), Some("0.0.0.0"));
    assert_eq!(ns.value("server.port").unwrap().as_integer(), Some(3000));
}

#[test]
fn typed_config_through_context() {
    #[derive(Debug, Deserialize)]
    struct Server {
        host: String,
        port: u16,
        tags: Vec<String>,
    }

    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "default.conf",
        r#"
        group(server) {
            set(host, "localhost")
            set(port, 8080)
            set(tags, ["web", "api"])
        }
        "#,
    );
    write(&dir, "local.conf", "group(server) { set(port, 9090) }");

    let mut registry = Registry::new();
    Loader::new(FileResolver::with_base(dir.path()))
        .with_script("default.conf", true)
        .with_script("local.conf", false)
        .with_script("missing.conf", false)
        .load(&mut registry, "app")
        .unwrap();

    let ctx = AppContext::builder("app")
        .with_registry(registry)
        .build()
        .unwrap();
    let server: Server = ctx.config().get_as("server").unwrap();

    assert_eq!(server.host, "localhost");
    assert_eq!(server.port, 9090);
    assert_eq!(server.tags, vec!["web", "api"]);
}

#[test]
fn script_error_reports_location() {
    let dir = TempDir::new().unwrap();
    write(&dir, "bad.conf", "set(a, 1)\nunset(b)\nset(c, 3)\n");

    let resolver = FileResolver::with_base(dir.path());
    let mut ns = Namespace::new();
    let err = ns
        .load("bad.conf", LoadOptions::required(), &resolver)
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "error in 'bad.conf' at line 2: cannot unset 'b': key not found"
    );
    assert!(ns.exists("a"));
    assert!(!ns.exists("c"));
}

#[test]
fn clear_isolates_registry() {
    let mut registry = Registry::new();
    registry.config("app").set("a", 1);
    registry.clear();

    assert!(!registry.contains("app"));
    assert!(!registry.config("app").exists("a"));
}
