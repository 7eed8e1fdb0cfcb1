//! High-level commands for mcphub operations.
//!
//! This module provides the public API used by the CLI to initialize the
//! store, add and remove aliases, list servers and plan launches.

pub mod add;
pub mod context;
pub mod list;
pub mod remove;
pub mod run;

pub use add::{AddCommand, AddOptions, AddReport};
pub use context::HubContext;
pub use list::{CatalogServer, ConfiguredServer, ListCommand, ListOptions, ListReport};
pub use remove::{RemoveCommand, RemoveReport};
pub use run::{RunCommand, RunOptions, RunPlan};
