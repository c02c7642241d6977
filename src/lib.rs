pub mod config;
pub mod context;
mod error;

pub use config::{
    ConfigError, EnvSource, FileResolver, LoadOptions, Loader, MemoryResolver, Namespace,
    Registry, Script, Setting, SourceResolver,
};
pub use context::AppContext;
pub use error::Error;
