//! Resolution of store aliases into launchable configurations.

pub mod resolved;
pub mod resolver;

pub use resolved::{ResolvedServerConfig, ResolvedSource};
pub use resolver::Resolver;
