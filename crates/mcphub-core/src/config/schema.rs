//! Store entry schema for `.mcphub.json`.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Root key of the canonical store document
pub const SERVERS_KEY: &str = "mcpServers";

/// Spellings accepted for the package reference on input.
pub(crate) const PACKAGE_KEYS: [&str; 3] = ["package_id", "name", "package_name"];

/// Per-alias override stored in the project file.
///
/// Either references a catalog package by id, or carries an inline
/// command and args that bypass the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerOverride {
    /// Catalog package id
    #[serde(
        default,
        alias = "name",
        alias = "package_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub package_id: Option<String>,

    /// Inline command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Inline command arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Environment values; each key shadows the catalog default
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<IndexSet<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_script: Option<String>,

    /// Fields mcphub does not interpret, written back unchanged
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ServerOverride {
    /// Override that points at a catalog package.
    pub fn package(package_id: impl Into<String>) -> Self {
        Self {
            package_id: Some(package_id.into()),
            ..Self::default()
        }
    }

    /// Override that supplies its own command line.
    pub fn inline(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args: Some(args),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Non-empty inline command, if any.
    pub fn inline_command(&self) -> Option<&str> {
        self.command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
    }

    /// True when command and args together make the entry self-contained.
    pub fn is_inline(&self) -> bool {
        self.inline_command().is_some() && self.args.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_package_spellings() {
        for key in PACKAGE_KEYS {
            let json = format!(r#"{{"{key}": "acme/tool"}}"#);
            let entry: ServerOverride = serde_json::from_str(&json).unwrap();
            assert_eq!(entry.package_id.as_deref(), Some("acme/tool"), "key {key}");
        }
    }

    #[test]
    fn serializes_canonical_key_and_omits_absent_fields() {
        let entry = ServerOverride::package("acme/tool").with_env("TOKEN", "abc");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"package_id": "acme/tool", "env": {"TOKEN": "abc"}})
        );
    }

    #[test]
    fn unknown_fields_round_trip() {
        let json = r#"{"name": "acme/tool", "disabled": true, "notes": {"owner": "ops"}}"#;
        let entry: ServerOverride = serde_json::from_str(json).unwrap();
        assert_eq!(entry.package_id.as_deref(), Some("acme/tool"));
        assert_eq!(entry.extra["disabled"], serde_json::json!(true));
        assert!(!entry.extra.contains_key("name"));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "package_id": "acme/tool",
                "disabled": true,
                "notes": {"owner": "ops"}
            })
        );
    }

    #[test]
    fn inline_requires_command_and_args() {
        assert!(ServerOverride::inline("python", vec!["server.py".into()]).is_inline());
        assert!(ServerOverride::inline("python", vec![]).is_inline());

        let command_only = ServerOverride {
            command: Some("python".into()),
            ..ServerOverride::default()
        };
        assert!(!command_only.is_inline());
        assert_eq!(command_only.inline_command(), Some("python"));

        let blank = ServerOverride::inline("  ", vec!["x".into()]);
        assert!(!blank.is_inline());
        assert!(blank.inline_command().is_none());
    }
}
