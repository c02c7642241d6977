use dragon_settings::{AppContext, FileResolver, Loader, Registry};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct DatabaseSection {
    host: String,
    port: u16,
    name: String,
}

fn main() -> Result<(), dragon_settings::Error> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut registry = Registry::new();
    Loader::new(FileResolver::with_base("demos/config"))
        .with_script("default.conf", true)
        .with_env("DRAGON", "__")
        .load(&mut registry, "app")?;

    let ctx = AppContext::builder("app").with_registry(registry).build()?;
    let config = ctx.config();

    let name = config.get_as::<String>("name")?;
    let debug = config.get_as::<bool>("debug")?;
    let database: DatabaseSection = config.get_as("database")?;

    println!("App: {name} (debug={debug})");
    println!(
        "Database: postgres://{}:{}/{}",
        database.host, database.port, database.name
    );

    Ok(())
}
