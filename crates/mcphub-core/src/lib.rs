//! mcphub core library
//!
//! Resolves project-local MCP server aliases into launchable commands by
//! merging the `.mcphub.json` store with a read-only catalog of known
//! server definitions.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod launch;
pub mod resolve;
pub mod validate;

pub use error::{Error, Result};
pub use validate::{NOT_SET, missing_required_env};

/// Re-exports of commonly used types
pub mod prelude {
    // Catalog
    pub use crate::catalog::{Catalog, CatalogLookup, ServerDefinition};

    // Store
    pub use crate::config::{ConfigStore, ServerOverride, STORE_FILE_NAME};

    // Resolution
    pub use crate::resolve::{ResolvedServerConfig, ResolvedSource, Resolver};

    // Launch
    pub use crate::launch::{GatewayOptions, LaunchSpec, to_gateway_argv, to_stdio_argv};

    // Commands
    pub use crate::commands::{
        AddCommand, AddOptions, HubContext, ListCommand, ListOptions, RemoveCommand, RunCommand,
        RunOptions,
    };

    pub use crate::error::{Error, Result};
    pub use crate::validate::{NOT_SET, missing_required_env};
}
