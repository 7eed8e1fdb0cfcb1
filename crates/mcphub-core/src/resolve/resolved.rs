//! Resolved launch parameters for one alias.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::{Error, Result};

/// Where the command line of a resolved config came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedSource {
    /// Command and args from the catalog entry `package_id`
    Catalog { package_id: String },
    /// Command and args given inline in the store
    Inline,
}

/// Immutable merge of a store entry with its catalog definition.
///
/// Produced by [`crate::resolve::Resolver`]. The working directory starts
/// unbound and can be bound once with [`ResolvedServerConfig::bind_cwd`];
/// it is never written back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedServerConfig {
    alias: String,
    source: ResolvedSource,
    command: String,
    args: Vec<String>,
    env: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    tags: IndexSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    setup_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<PathBuf>,
}

/// Descriptive fields shared by both resolution paths.
#[derive(Debug, Clone, Default)]
pub(crate) struct Metadata {
    pub description: Option<String>,
    pub tags: IndexSet<String>,
    pub repo_url: Option<String>,
    pub setup_script: Option<String>,
}

impl ResolvedServerConfig {
    pub(crate) fn new(
        alias: String,
        source: ResolvedSource,
        command: String,
        args: Vec<String>,
        env: IndexMap<String, String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            alias,
            source,
            command,
            args,
            env,
            description: metadata.description,
            tags: metadata.tags,
            repo_url: metadata.repo_url,
            setup_script: metadata.setup_script,
            cwd: None,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn source(&self) -> &ResolvedSource {
        &self.source
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &IndexSet<String> {
        &self.tags
    }

    pub fn repo_url(&self) -> Option<&str> {
        self.repo_url.as_deref()
    }

    pub fn setup_script(&self) -> Option<&str> {
        self.setup_script.as_deref()
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Bind the working directory, typically after the setup script ran.
    ///
    /// Consumes the value so a stale binding cannot be reused; binding a
    /// second time fails with [`Error::CwdAlreadyBound`].
    pub fn bind_cwd(mut self, cwd: impl Into<PathBuf>) -> Result<Self> {
        if self.cwd.is_some() {
            return Err(Error::CwdAlreadyBound { alias: self.alias });
        }
        self.cwd = Some(cwd.into());
        Ok(self)
    }
}
