//! List command implementation.

use std::path::PathBuf;

use serde::Serialize;

use super::context::HubContext;
use crate::error::{Error, Result};

/// Options for listing servers
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Also list every catalog package
    pub all: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }
}

/// Alias configured in the store
#[derive(Debug, Clone, Serialize)]
pub struct ConfiguredServer {
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Package available in the catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogServer {
    pub package_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListReport {
    /// Store file, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    pub configured: Vec<ConfiguredServer>,
    /// Catalog packages, present only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<CatalogServer>>,
}

#[derive(Debug)]
pub struct ListCommand<'a> {
    ctx: &'a HubContext,
}

impl<'a> ListCommand<'a> {
    pub fn new(ctx: &'a HubContext) -> Self {
        Self { ctx }
    }

    /// List store aliases in insertion order. A missing store lists as
    /// empty.
    pub fn execute(&self, options: &ListOptions) -> Result<ListReport> {
        let (store_path, configured) = match self.ctx.open_store() {
            Ok(store) => {
                let configured = store
                    .servers()
                    .iter()
                    .map(|(alias, server)| ConfiguredServer {
                        alias: alias.clone(),
                        package_id: server.package_id.clone(),
                        command: server.inline_command().map(str::to_string),
                    })
                    .collect();
                (Some(store.path().to_path_buf()), configured)
            }
            Err(Error::ConfigNotFound { .. }) => (None, Vec::new()),
            Err(err) => return Err(err),
        };

        let available = if options.all {
            let servers = self
                .ctx
                .catalog()?
                .iter()
                .map(|(package_id, definition)| CatalogServer {
                    package_id: package_id.to_string(),
                    description: definition.description.clone(),
                })
                .collect();
            Some(servers)
        } else {
            None
        };

        Ok(ListReport {
            store_path,
            configured,
            available,
        })
    }
}
