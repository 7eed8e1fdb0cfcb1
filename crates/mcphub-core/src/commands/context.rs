//! Hub context providing the store location and catalog to commands.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::catalog::{Catalog, default_catalog_path};
use crate::config::{ConfigStore, InitReport, locate_from};
use crate::error::{Error, Result};
use crate::resolve::{ResolvedServerConfig, Resolver};

/// Dependency container for hub commands.
///
/// The catalog is loaded on first use and then shared by every resolution,
/// so commands that only touch the store keep working when the catalog file
/// is broken. The store is re-read from disk for each operation so a command
/// always sees the latest persisted state.
#[derive(Debug, Clone)]
pub struct HubContext {
    /// Directory the store search starts from
    project_root: PathBuf,
    /// Catalog file read on first access; `None` means no catalog
    catalog_path: Option<PathBuf>,
    catalog: OnceLock<Catalog>,
}

impl HubContext {
    /// Context over an already loaded catalog.
    pub fn new(project_root: PathBuf, catalog: Catalog) -> Self {
        Self {
            project_root,
            catalog_path: None,
            catalog: OnceLock::from(catalog),
        }
    }

    /// Context whose catalog is read from `catalog_path` when first needed.
    pub fn with_catalog_path(project_root: PathBuf, catalog_path: Option<PathBuf>) -> Self {
        Self {
            project_root,
            catalog_path,
            catalog: OnceLock::new(),
        }
    }

    /// Current directory plus the catalog at its default location.
    pub fn with_defaults() -> Result<Self> {
        let project_root = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let catalog_path = default_catalog_path();
        if catalog_path.is_none() {
            tracing::warn!("could not determine catalog location, using empty catalog");
        }
        Ok(Self::with_catalog_path(project_root, catalog_path))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The catalog, loading it on first call.
    ///
    /// A load failure is returned to the caller and retried on the next call.
    pub fn catalog(&self) -> Result<&Catalog> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        let loaded = match &self.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::empty(),
        };
        Ok(self.catalog.get_or_init(|| loaded))
    }

    pub fn resolver(&self) -> Result<Resolver<'_>> {
        Ok(Resolver::new(self.catalog()?))
    }

    /// Path of the closest store file.
    pub fn store_path(&self) -> Result<PathBuf> {
        locate_from(&self.project_root)
    }

    pub fn open_store(&self) -> Result<ConfigStore> {
        ConfigStore::open(self.store_path()?)
    }

    /// Create an empty store in the project root if none exists there.
    pub fn init(&self) -> Result<InitReport> {
        ConfigStore::init(&self.project_root)
    }

    /// Resolve `alias` against the current store contents.
    pub fn resolve(&self, alias: &str) -> Result<ResolvedServerConfig> {
        let store = self.open_store()?;
        self.resolver()?.resolve(&store, alias)
    }
}
