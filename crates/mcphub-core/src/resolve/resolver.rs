//! Merge a store entry with its catalog definition.
//!
//! Precedence, highest first:
//! 1. Inline command plus args on the store entry (catalog bypassed)
//! 2. Catalog definition for the entry's package id, with store env and
//!    metadata layered on top
//! 3. Inline command without args (runs with no arguments)
//!
//! Anything else has no authoritative source and fails.

use indexmap::IndexMap;

use super::resolved::{Metadata, ResolvedServerConfig, ResolvedSource};
use crate::catalog::{CatalogLookup, ServerDefinition};
use crate::config::{ConfigStore, ServerOverride};
use crate::error::{Error, Result};

/// Resolves aliases against an explicitly supplied catalog.
///
/// Holds no state besides the catalog reference: every call computes its
/// result from the store and catalog contents alone.
pub struct Resolver<'a> {
    catalog: &'a dyn CatalogLookup,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn CatalogLookup) -> Self {
        Self { catalog }
    }

    /// Resolve `alias` from the store.
    pub fn resolve(&self, store: &ConfigStore, alias: &str) -> Result<ResolvedServerConfig> {
        let entry = store.get(alias).ok_or_else(|| Error::AliasNotFound {
            alias: alias.to_string(),
        })?;
        self.resolve_entry(alias, entry)
    }

    /// Resolve a single store entry without consulting a store.
    pub fn resolve_entry(
        &self,
        alias: &str,
        entry: &ServerOverride,
    ) -> Result<ResolvedServerConfig> {
        if entry.is_inline() {
            tracing::debug!(alias, "resolving inline server");
            return Ok(resolve_inline(alias, entry));
        }

        let definition = entry
            .package_id
            .as_deref()
            .and_then(|id| self.catalog.lookup(id).map(|def| (id, def)));

        if let Some((package_id, definition)) = definition {
            if let Some(command) = entry.inline_command() {
                tracing::warn!(
                    alias,
                    command,
                    package_id,
                    "inline command without args is ignored in favor of catalog entry"
                );
            }
            tracing::debug!(alias, package_id, "resolving from catalog");
            return Ok(resolve_catalog(alias, package_id, definition, entry));
        }

        if entry.inline_command().is_some() {
            tracing::debug!(alias, "resolving inline server without args");
            return Ok(resolve_inline(alias, entry));
        }

        Err(Error::ServerConfigNotFound {
            alias: alias.to_string(),
            package_id: entry.package_id.clone(),
        })
    }
}

fn resolve_inline(alias: &str, entry: &ServerOverride) -> ResolvedServerConfig {
    let metadata = Metadata {
        description: entry.description.clone(),
        tags: entry.tags.clone().unwrap_or_default(),
        repo_url: entry.repo_url.clone(),
        setup_script: entry.setup_script.clone(),
    };

    ResolvedServerConfig::new(
        alias.to_string(),
        ResolvedSource::Inline,
        entry.inline_command().unwrap_or_default().to_string(),
        entry.args.clone().unwrap_or_default(),
        entry.env.clone(),
        metadata,
    )
}

fn resolve_catalog(
    alias: &str,
    package_id: &str,
    definition: &ServerDefinition,
    entry: &ServerOverride,
) -> ResolvedServerConfig {
    let metadata = Metadata {
        description: entry
            .description
            .clone()
            .or_else(|| definition.description.clone()),
        tags: entry.tags.clone().unwrap_or_else(|| definition.tags.clone()),
        repo_url: entry.repo_url.clone().or_else(|| definition.repo_url.clone()),
        setup_script: entry
            .setup_script
            .clone()
            .or_else(|| definition.setup_script.clone()),
    };

    ResolvedServerConfig::new(
        alias.to_string(),
        ResolvedSource::Catalog {
            package_id: package_id.to_string(),
        },
        definition.command.clone(),
        definition.args.clone(),
        merge_env(&definition.env, &entry.env),
        metadata,
    )
}

/// Catalog defaults overlaid by override values, override winning per key.
///
/// Catalog keys keep their position; override-only keys follow in override
/// order.
fn merge_env(
    defaults: &IndexMap<String, String>,
    overrides: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NOT_SET;

    fn catalog() -> IndexMap<String, ServerDefinition> {
        let mut catalog = IndexMap::new();
        catalog.insert(
            "acme/tool".to_string(),
            ServerDefinition::new("node", vec!["dist/index.js".into()])
                .with_env("TOKEN", NOT_SET)
                .with_env("MODE", "fast")
                .with_description("Acme tool")
                .with_tag("acme")
                .with_setup_script("npm install"),
        );
        catalog
    }

    #[test]
    fn catalog_entry_with_env_override() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let entry = ServerOverride::package("acme/tool").with_env("TOKEN", "abc");

        let resolved = resolver.resolve_entry("mytool", &entry).unwrap();

        assert_eq!(resolved.alias(), "mytool");
        assert_eq!(resolved.command(), "node");
        assert_eq!(resolved.args(), ["dist/index.js"]);
        assert_eq!(resolved.env()["TOKEN"], "abc");
        assert_eq!(resolved.env()["MODE"], "fast");
        assert_eq!(resolved.description(), Some("Acme tool"));
        assert_eq!(resolved.setup_script(), Some("npm install"));
        assert!(resolved.cwd().is_none());
        assert_eq!(
            resolved.source(),
            &ResolvedSource::Catalog {
                package_id: "acme/tool".into()
            }
        );
    }

    #[test]
    fn unmentioned_keys_keep_sentinel() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);

        let resolved = resolver
            .resolve_entry("mytool", &ServerOverride::package("acme/tool"))
            .unwrap();

        assert_eq!(resolved.env()["TOKEN"], NOT_SET);
    }

    #[test]
    fn override_only_keys_follow_catalog_keys() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let entry = ServerOverride::package("acme/tool")
            .with_env("EXTRA", "1")
            .with_env("TOKEN", "abc");

        let resolved = resolver.resolve_entry("mytool", &entry).unwrap();
        let keys: Vec<_> = resolved.env().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["TOKEN", "MODE", "EXTRA"]);
    }

    #[test]
    fn override_metadata_wins() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let mut entry = ServerOverride::package("acme/tool").with_description("mine");
        entry.tags = Some(["custom".to_string()].into_iter().collect());

        let resolved = resolver.resolve_entry("mytool", &entry).unwrap();
        assert_eq!(resolved.description(), Some("mine"));
        assert!(resolved.tags().contains("custom"));
        assert!(!resolved.tags().contains("acme"));
        assert_eq!(resolved.setup_script(), Some("npm install"));
    }

    #[test]
    fn inline_bypasses_catalog() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let mut entry =
            ServerOverride::inline("python", vec!["server.py".into()]).with_env("PORT", "1");
        entry.package_id = Some("acme/tool".into());

        let resolved = resolver.resolve_entry("local", &entry).unwrap();
        assert_eq!(resolved.command(), "python");
        assert_eq!(resolved.args(), ["server.py"]);
        assert_eq!(resolved.env().len(), 1);
        assert_eq!(resolved.env()["PORT"], "1");
        assert!(resolved.description().is_none());
        assert_eq!(resolved.source(), &ResolvedSource::Inline);
    }

    #[test]
    fn command_without_args_prefers_catalog() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let mut entry = ServerOverride::package("acme/tool");
        entry.command = Some("python".into());

        let resolved = resolver.resolve_entry("mytool", &entry).unwrap();
        assert_eq!(resolved.command(), "node");
    }

    #[test]
    fn command_without_args_and_unknown_package_runs_inline() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let mut entry = ServerOverride::package("unknown/pkg");
        entry.command = Some("./serve".into());

        let resolved = resolver.resolve_entry("local", &entry).unwrap();
        assert_eq!(resolved.command(), "./serve");
        assert!(resolved.args().is_empty());
    }

    #[test]
    fn unknown_package_without_command_fails() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);

        let err = resolver
            .resolve_entry("ghost", &ServerOverride::package("unknown/pkg"))
            .unwrap_err();
        match err {
            Error::ServerConfigNotFound { alias, package_id } => {
                assert_eq!(alias, "ghost");
                assert_eq!(package_id.as_deref(), Some("unknown/pkg"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_entry_fails() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);

        let err = resolver
            .resolve_entry("empty", &ServerOverride::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ServerConfigNotFound { package_id: None, .. }
        ));
    }

    #[test]
    fn bind_cwd_once() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let resolved = resolver
            .resolve_entry("mytool", &ServerOverride::package("acme/tool"))
            .unwrap();

        let bound = resolved.bind_cwd("/srv/tool").unwrap();
        assert_eq!(bound.cwd(), Some(std::path::Path::new("/srv/tool")));

        let err = bound.bind_cwd("/elsewhere").unwrap_err();
        assert!(matches!(err, Error::CwdAlreadyBound { .. }));
    }
}
