//! Error types for store, catalog and resolution operations.
//!
//! Not-found variants are recoverable: callers are expected to catch them
//! and offer the available aliases or catalog entries. Parse and schema
//! variants are fatal and carry enough context to locate the bad entry.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized Result type for mcphub operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No store file was found walking up from the starting directory.
    #[error(
        "Configuration file '{}' not found in {} or any parent directory",
        .file_name,
        .start.display()
    )]
    ConfigNotFound {
        file_name: &'static str,
        start: PathBuf,
    },

    /// The store file is not a well-formed document.
    #[error("Failed to parse config file {}: {}", .path.display(), .message)]
    ConfigParse { path: PathBuf, message: String },

    /// The catalog file is malformed or holds an invalid definition.
    #[error("Failed to parse catalog {}: {}", .path.display(), .message)]
    CatalogParse { path: PathBuf, message: String },

    /// A store entry does not match any accepted shape.
    #[error("Invalid configuration for '{alias}': {message}")]
    Schema { alias: String, message: String },

    #[error("MCP server '{alias}' is not configured")]
    AliasNotFound { alias: String },

    /// The alias references no catalog package and has no inline command.
    #[error("{}", server_not_found_message(.alias, .package_id.as_deref()))]
    ServerConfigNotFound {
        alias: String,
        package_id: Option<String>,
    },

    #[error("MCP server '{alias}' is already configured. Use --force to overwrite.")]
    DuplicateAlias { alias: String },

    #[error("Working directory for '{alias}' is already bound")]
    CwdAlreadyBound { alias: String },

    /// The in-memory store could not be rendered back to JSON.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid gateway option: {0}")]
    InvalidGateway(String),

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            alias: alias.into(),
            message: message.into(),
        }
    }

    /// Whether the caller can recover by presenting alternatives.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AliasNotFound { .. } | Self::ServerConfigNotFound { .. }
        )
    }
}

fn server_not_found_message(alias: &str, package_id: Option<&str>) -> String {
    match package_id {
        Some(id) => format!(
            "Server '{id}' (alias '{alias}') not found in the catalog. \
             Add command and args for this server."
        ),
        None => format!("MCP server '{alias}' has neither a package id nor an inline command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        assert!(Error::AliasNotFound { alias: "a".into() }.is_not_found());
        assert!(
            Error::ServerConfigNotFound {
                alias: "a".into(),
                package_id: Some("acme/tool".into()),
            }
            .is_not_found()
        );
        assert!(!Error::DuplicateAlias { alias: "a".into() }.is_not_found());
        assert!(!Error::schema("a", "bad").is_not_found());
    }

    #[test]
    fn server_not_found_names_package() {
        let err = Error::ServerConfigNotFound {
            alias: "mytool".into(),
            package_id: Some("acme/tool".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme/tool"));
        assert!(msg.contains("mytool"));

        let err = Error::ServerConfigNotFound {
            alias: "bare".into(),
            package_id: None,
        };
        assert!(err.to_string().contains("neither a package id"));
    }
}
