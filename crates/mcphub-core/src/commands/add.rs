//! Add command implementation.

use std::path::PathBuf;

use indexmap::IndexMap;

use super::context::HubContext;
use crate::config::ServerOverride;
use crate::error::Result;
use crate::resolve::ResolvedServerConfig;
use crate::validate::missing_required_env;

/// Options for adding a server alias
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Alias to store the server under
    pub alias: String,
    /// Catalog package id (defaults to the alias)
    pub package_id: Option<String>,
    /// Env values written to the store
    pub env: IndexMap<String, String>,
    /// Inline command line; bypasses the catalog when non-empty
    pub command: Vec<String>,
    pub description: Option<String>,
    /// Replace an existing alias with different content
    pub overwrite: bool,
}

impl AddOptions {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            package_id: None,
            env: IndexMap::new(),
            command: Vec::new(),
            description: None,
            overwrite: false,
        }
    }

    pub fn with_package(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_command(mut self, command: &[String]) -> Self {
        self.command = command.to_vec();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Package id this alias refers to.
    pub fn package_id(&self) -> &str {
        self.package_id.as_deref().unwrap_or(&self.alias)
    }

    fn to_override(&self) -> ServerOverride {
        let mut server = match self.command.split_first() {
            Some((command, args)) => {
                let mut server = ServerOverride::inline(command.clone(), args.to_vec());
                server.package_id = self.package_id.clone();
                server
            }
            None => ServerOverride::package(self.package_id()),
        };
        server.env = self.env.clone();
        server.description = self.description.clone();
        server
    }
}

/// Result of an add operation
#[derive(Debug, Clone)]
pub struct AddReport {
    pub alias: String,
    /// False when the alias was already stored with identical content
    pub changed: bool,
    /// Store file that was written
    pub path: PathBuf,
    /// Required env vars still unset after the merge
    pub missing_env: Vec<String>,
}

/// Add command orchestrator
#[derive(Debug)]
pub struct AddCommand<'a> {
    ctx: &'a HubContext,
}

impl<'a> AddCommand<'a> {
    pub fn new(ctx: &'a HubContext) -> Self {
        Self { ctx }
    }

    /// Resolve the options without touching the store.
    ///
    /// Fails with [`crate::Error::ServerConfigNotFound`] when the package is not in
    /// the catalog and no inline command was given.
    pub fn preview(&self, options: &AddOptions) -> Result<ResolvedServerConfig> {
        self.ctx
            .resolver()?
            .resolve_entry(&options.alias, &options.to_override())
    }

    pub fn execute(&self, options: &AddOptions) -> Result<AddReport> {
        let resolved = self.preview(options)?;
        let missing_env = missing_required_env(&resolved);

        let mut store = self.ctx.open_store()?;
        let changed = store.add(&options.alias, options.to_override(), options.overwrite)?;

        if !missing_env.is_empty() {
            tracing::warn!(
                alias = %options.alias,
                missing = ?missing_env,
                "required environment variables are not set"
            );
        }

        Ok(AddReport {
            alias: options.alias.clone(),
            changed,
            path: store.path().to_path_buf(),
            missing_env,
        })
    }
}
