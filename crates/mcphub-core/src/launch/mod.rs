//! Projection of resolved configs into process launch parameters.
//!
//! Only composes argv/env/cwd. Spawning and supervising the process is
//! left to the caller, and the gateway's wire protocol is opaque here.

pub mod gateway;

use std::path::PathBuf;
use std::process::Command;

use indexmap::IndexMap;

use crate::error::Result;
use crate::resolve::ResolvedServerConfig;

pub use gateway::{GatewayOptions, to_gateway_argv};

/// `[command] + args`, unmodified.
pub fn to_stdio_argv(resolved: &ResolvedServerConfig) -> Vec<String> {
    let mut argv = Vec::with_capacity(resolved.args().len() + 1);
    argv.push(resolved.command().to_string());
    argv.extend(resolved.args().iter().cloned());
    argv
}

/// Process invocation ready to hand to a spawner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: IndexMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl LaunchSpec {
    /// Launch the server directly, speaking stdio.
    pub fn stdio(resolved: &ResolvedServerConfig) -> Self {
        Self::from_argv(to_stdio_argv(resolved), resolved)
    }

    /// Launch the server wrapped by the network gateway.
    pub fn gateway(resolved: &ResolvedServerConfig, options: &GatewayOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::from_argv(gateway::compose(resolved, options), resolved))
    }

    fn from_argv(mut argv: Vec<String>, resolved: &ResolvedServerConfig) -> Self {
        let program = argv.remove(0);
        Self {
            program,
            args: argv,
            env: resolved.env().clone(),
            cwd: resolved.cwd().map(|p| p.to_path_buf()),
        }
    }

    /// Full argv, program first.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Display form of the command line.
    pub fn display(&self) -> String {
        self.argv().join(" ")
    }

    /// Build a [`Command`] carrying argv, env and cwd.
    ///
    /// The env is added on top of the inherited process environment.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(&self.env);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServerDefinition;
    use crate::config::ServerOverride;
    use crate::resolve::Resolver;

    fn resolved() -> ResolvedServerConfig {
        let mut catalog = IndexMap::new();
        catalog.insert(
            "acme/tool".to_string(),
            ServerDefinition::new("node", vec!["dist/index.js".into(), "--stdio".into()])
                .with_env("TOKEN", "abc"),
        );
        Resolver::new(&catalog)
            .resolve_entry("mytool", &ServerOverride::package("acme/tool"))
            .unwrap()
    }

    #[test]
    fn stdio_argv_is_command_then_args() {
        assert_eq!(
            to_stdio_argv(&resolved()),
            vec!["node", "dist/index.js", "--stdio"]
        );
    }

    #[test]
    fn stdio_spec_carries_env_and_cwd() {
        let resolved = resolved().bind_cwd("/srv/tool").unwrap();
        let spec = LaunchSpec::stdio(&resolved);

        assert_eq!(spec.program, "node");
        assert_eq!(spec.args, vec!["dist/index.js", "--stdio"]);
        assert_eq!(spec.env["TOKEN"], "abc");
        assert_eq!(spec.cwd, Some(PathBuf::from("/srv/tool")));
        assert_eq!(spec.display(), "node dist/index.js --stdio");
    }

    #[test]
    fn gateway_spec_wraps_stdio_command() {
        let spec = LaunchSpec::gateway(&resolved(), &GatewayOptions::default()).unwrap();

        assert_eq!(spec.program, "npx");
        assert_eq!(
            spec.args,
            vec![
                "-y",
                "supergateway",
                "--stdio",
                "node dist/index.js --stdio",
                "--port",
                "8000",
                "--baseUrl",
                "http://localhost:8000",
                "--ssePath",
                "/sse",
                "--messagePath",
                "/message",
            ]
        );
        assert_eq!(spec.env["TOKEN"], "abc");
    }

    #[test]
    fn gateway_spec_uses_custom_launcher() {
        let options = GatewayOptions {
            launcher: vec!["supergateway".into()],
            ..GatewayOptions::default()
        };
        let spec = LaunchSpec::gateway(&resolved(), &options).unwrap();

        assert_eq!(spec.program, "supergateway");
        assert_eq!(spec.args[0], "--stdio");
        assert_eq!(spec.args[1], "node dist/index.js --stdio");
    }

    #[test]
    fn gateway_spec_rejects_invalid_options() {
        let options = GatewayOptions {
            port: 0,
            ..GatewayOptions::default()
        };
        assert!(LaunchSpec::gateway(&resolved(), &options).is_err());
    }

    #[test]
    fn to_command_sets_program_and_args() {
        let spec = LaunchSpec::stdio(&resolved());
        let command = spec.to_command();

        assert_eq!(command.get_program(), "node");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["dist/index.js", "--stdio"]);
        let token = command
            .get_envs()
            .find(|(key, _)| key.to_str() == Some("TOKEN"))
            .and_then(|(_, value)| value)
            .and_then(|value| value.to_str());
        assert_eq!(token, Some("abc"));
    }
}
