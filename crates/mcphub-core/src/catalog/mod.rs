//! Read-only catalog of known MCP server definitions.
//!
//! The catalog ships separately from the project store and is loaded once
//! per process. It is never mutated after loading, so a single instance can
//! be shared by any number of resolutions.

pub mod loader;
pub mod schema;

pub use loader::{CATALOG_ENV_VAR, CATALOG_FILE_NAME, Catalog, default_catalog_path};
pub use schema::ServerDefinition;

/// Lookup seam used by the resolver.
///
/// Implemented by [`Catalog`] and by a plain ordered map so tests can hand
/// the resolver a catalog built in memory.
pub trait CatalogLookup {
    fn lookup(&self, package_id: &str) -> Option<&ServerDefinition>;
}

impl CatalogLookup for Catalog {
    fn lookup(&self, package_id: &str) -> Option<&ServerDefinition> {
        self.get(package_id)
    }
}

impl CatalogLookup for indexmap::IndexMap<String, ServerDefinition> {
    fn lookup(&self, package_id: &str) -> Option<&ServerDefinition> {
        self.get(package_id)
    }
}
