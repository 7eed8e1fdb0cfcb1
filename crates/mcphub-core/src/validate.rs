//! Advisory checks on resolved configurations.

use crate::resolve::ResolvedServerConfig;

/// Env value meaning "required, but no value has been provided yet"
pub const NOT_SET: &str = "NOT SET";

/// Variables still holding [`NOT_SET`], in merged env order.
///
/// Never fails: the caller decides whether to block, prompt or proceed.
pub fn missing_required_env(resolved: &ResolvedServerConfig) -> Vec<String> {
    missing_in(resolved.env().iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Same check over any ordered env listing.
pub fn missing_in<'a, I>(env: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    env.into_iter()
        .filter(|(_, value)| *value == NOT_SET)
        .map(|(key, _)| key.to_string())
        .collect()
}
