//! Configuration namespaces, scripts and the named registry.

mod builder;
mod env;
mod error;
mod file;
mod lexer;
mod namespace;
mod parser;
mod registry;
mod script;
mod source;

pub use builder::Loader;
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileResolver;
pub use namespace::{Namespace, Setting};
pub use registry::Registry;
pub use script::{LoadOptions, Op, Script, Statement};
pub use source::{MemoryResolver, SourceResolver};
