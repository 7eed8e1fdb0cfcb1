//! Remove command implementation.

use super::context::HubContext;
use crate::error::Result;

/// Result of a remove operation
#[derive(Debug, Clone)]
pub struct RemoveReport {
    pub alias: String,
    /// False when the alias was not configured
    pub removed: bool,
    /// Aliases left in the store, for presenting alternatives
    pub remaining: Vec<String>,
}

#[derive(Debug)]
pub struct RemoveCommand<'a> {
    ctx: &'a HubContext,
}

impl<'a> RemoveCommand<'a> {
    pub fn new(ctx: &'a HubContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, alias: &str) -> Result<RemoveReport> {
        let mut store = self.ctx.open_store()?;
        let removed = store.remove(alias)?.is_some();

        if !removed {
            tracing::debug!(alias, "alias not present in store");
        }

        Ok(RemoveReport {
            alias: alias.to_string(),
            removed,
            remaining: store.list().into_iter().map(str::to_string).collect(),
        })
    }
}
