//! Interactive prompts for the add command.
//!
//! Asks for values of required environment variables that are still unset
//! after the catalog merge. Uses dialoguer for terminal UI prompts.

use anyhow::Result;
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};
use indexmap::IndexMap;

/// Prompts for env values, one variable at a time.
pub struct EnvPrompt {
    theme: ColorfulTheme,
}

impl EnvPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Ask for each variable in `missing`. Empty answers are skipped so the
    /// variable stays unset.
    pub fn collect(&self, alias: &str, missing: &[String]) -> Result<IndexMap<String, String>> {
        let mut values = IndexMap::new();
        if missing.is_empty() {
            return Ok(values);
        }

        eprintln!(
            "{} '{}' needs the following environment variables:",
            style("?").yellow().bold(),
            alias
        );

        for var in missing {
            let value: String = Input::with_theme(&self.theme)
                .with_prompt(format!("{var} (leave empty to skip)"))
                .allow_empty(true)
                .interact_text()?;

            let value = value.trim();
            if !value.is_empty() {
                values.insert(var.clone(), value.to_string());
            }
        }

        Ok(values)
    }
}

impl Default for EnvPrompt {
    fn default() -> Self {
        Self::new()
    }
}
