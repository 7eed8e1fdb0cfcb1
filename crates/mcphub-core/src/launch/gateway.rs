//! Gateway wrapping: expose a stdio server over HTTP/SSE through an
//! external gateway binary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolve::ResolvedServerConfig;

use super::to_stdio_argv;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SSE_PATH: &str = "/sse";
pub const DEFAULT_MESSAGE_PATH: &str = "/message";

/// Gateway invocation prefix: `npx -y supergateway`
pub fn default_launcher() -> Vec<String> {
    vec!["npx".into(), "-y".into(), "supergateway".into()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOptions {
    /// Program and leading args that start the gateway
    pub launcher: Vec<String>,
    pub port: u16,
    pub base_url: String,
    pub sse_path: String,
    pub message_path: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            launcher: default_launcher(),
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            sse_path: DEFAULT_SSE_PATH.to_string(),
            message_path: DEFAULT_MESSAGE_PATH.to_string(),
        }
    }
}

impl GatewayOptions {
    pub fn validate(&self) -> Result<()> {
        if self.launcher.is_empty() || self.launcher[0].trim().is_empty() {
            return Err(Error::InvalidGateway("launcher must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::InvalidGateway("port must be non-zero".into()));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::InvalidGateway(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        for (name, path) in [
            ("SSE path", &self.sse_path),
            ("message path", &self.message_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::InvalidGateway(format!(
                    "{} '{}' must start with '/'",
                    name, path
                )));
            }
        }
        Ok(())
    }
}

/// Gateway argv carrying the stdio command line as a single string.
///
/// Only composes strings; the gateway is launched with
/// [`default_launcher`].
pub fn to_gateway_argv(
    resolved: &ResolvedServerConfig,
    port: u16,
    base_url: &str,
    sse_path: &str,
    message_path: &str,
) -> Vec<String> {
    let options = GatewayOptions {
        launcher: default_launcher(),
        port,
        base_url: base_url.to_string(),
        sse_path: sse_path.to_string(),
        message_path: message_path.to_string(),
    };
    compose(resolved, &options)
}

pub(crate) fn compose(resolved: &ResolvedServerConfig, options: &GatewayOptions) -> Vec<String> {
    let stdio = to_stdio_argv(resolved).join(" ");

    let mut argv = options.launcher.clone();
    argv.extend([
        "--stdio".to_string(),
        stdio,
        "--port".to_string(),
        options.port.to_string(),
        "--baseUrl".to_string(),
        options.base_url.clone(),
        "--ssePath".to_string(),
        options.sse_path.clone(),
        "--messagePath".to_string(),
        options.message_path.clone(),
    ]);
    argv
}
