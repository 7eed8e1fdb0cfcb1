//! Run command: resolve an alias into a launch plan.
//!
//! The plan is handed to the caller's process spawner; nothing is started
//! here.

use std::path::PathBuf;

use super::context::HubContext;
use crate::error::Result;
use crate::launch::{GatewayOptions, LaunchSpec};
use crate::resolve::ResolvedServerConfig;
use crate::validate::missing_required_env;

/// Options for running a server
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub alias: String,
    /// Wrap the server in the network gateway
    pub gateway: Option<GatewayOptions>,
    /// Working directory to launch in
    pub cwd: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            gateway: None,
            cwd: None,
        }
    }

    pub fn with_gateway(mut self, gateway: GatewayOptions) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Everything needed to launch one server
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub resolved: ResolvedServerConfig,
    pub launch: LaunchSpec,
    /// Required env vars still unset; the caller decides whether to block
    pub missing_env: Vec<String>,
}

#[derive(Debug)]
pub struct RunCommand<'a> {
    ctx: &'a HubContext,
}

impl<'a> RunCommand<'a> {
    pub fn new(ctx: &'a HubContext) -> Self {
        Self { ctx }
    }

    pub fn plan(&self, options: &RunOptions) -> Result<RunPlan> {
        let mut resolved = self.ctx.resolve(&options.alias)?;
        if let Some(cwd) = &options.cwd {
            resolved = resolved.bind_cwd(cwd.clone())?;
        }

        let missing_env = missing_required_env(&resolved);
        let launch = match &options.gateway {
            Some(gateway) => LaunchSpec::gateway(&resolved, gateway)?,
            None => LaunchSpec::stdio(&resolved),
        };

        tracing::debug!(alias = %options.alias, command = %launch.display(), "planned launch");

        Ok(RunPlan {
            resolved,
            launch,
            missing_env,
        })
    }
}
