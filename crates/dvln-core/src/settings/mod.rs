//! Setting registry and layered resolution

mod defaults;
mod registry;
mod resolver;
mod value;

pub use defaults::{API_VERSION, DEFAULT_PORT, dvln_registry};
pub use registry::{Registry, Scope, Setting, UserLevel};
pub use resolver::{ENV_PREFIX, Layer, Resolved, Settings};
pub use value::{Value, ValueKind, parse_bool};
