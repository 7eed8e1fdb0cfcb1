//! Catalog loading.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::schema::ServerDefinition;
use crate::config::parser::{json_error_message, toml_error_message};
use crate::error::{Error, Result};

/// File name of the catalog shipped alongside mcphub
pub const CATALOG_FILE_NAME: &str = "mcphub_preconfigured_servers.json";

/// Environment variable that points at an alternate catalog file
pub const CATALOG_ENV_VAR: &str = "MCPHUB_CATALOG";

/// Default catalog location: `$MCPHUB_CATALOG`, else the user config dir.
pub fn default_catalog_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CATALOG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("mcphub").join(CATALOG_FILE_NAME))
}

/// Immutable registry of known server definitions keyed by package id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    path: Option<PathBuf>,
    servers: IndexMap<String, ServerDefinition>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from in-memory definitions.
    pub fn from_definitions<I, K>(definitions: I) -> Self
    where
        I: IntoIterator<Item = (K, ServerDefinition)>,
        K: Into<String>,
    {
        Self {
            path: None,
            servers: definitions
                .into_iter()
                .map(|(id, def)| (id.into(), def))
                .collect(),
        }
    }

    /// Load the catalog, filling env defaults from the process environment.
    ///
    /// A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load the catalog using `env` to look up variable values.
    ///
    /// Any declared env key for which `env` returns a value takes that value
    /// instead of the baked default.
    pub fn load_with_env<F>(path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "catalog file absent, using empty catalog");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                servers: IndexMap::new(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut servers = parse_catalog_str(&content, path)?;

        for definition in servers.values_mut() {
            for (key, value) in definition.env.iter_mut() {
                if let Some(actual) = env(key) {
                    *value = actual;
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            count = servers.len(),
            "loaded server catalog"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            servers,
        })
    }

    /// Path the catalog was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, package_id: &str) -> Option<&ServerDefinition> {
        self.servers.get(package_id)
    }

    /// Package ids in document order.
    pub fn package_ids(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServerDefinition)> {
        self.servers.iter().map(|(id, def)| (id.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

/// Parse catalog content. Files with a `.toml` extension are read as TOML,
/// everything else as JSON.
pub fn parse_catalog_str(
    content: &str,
    path: &Path,
) -> Result<IndexMap<String, ServerDefinition>> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let servers: IndexMap<String, ServerDefinition> = if is_toml {
        toml::from_str(content).map_err(|e| Error::CatalogParse {
            path: path.to_path_buf(),
            message: toml_error_message(&e, content),
        })?
    } else {
        serde_json::from_str(content).map_err(|e| Error::CatalogParse {
            path: path.to_path_buf(),
            message: json_error_message(&e, content),
        })?
    };

    for (package_id, definition) in &servers {
        definition
            .validate()
            .map_err(|message| Error::CatalogParse {
                path: path.to_path_buf(),
                message: format!("server '{}': {}", package_id, message),
            })?;
    }

    Ok(servers)
}
