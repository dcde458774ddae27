//! Process environment snapshot.

use std::collections::HashMap;
use std::ffi::OsString;

/// Read the current process environment into a name → value map.
///
/// Entries whose name or value is not valid Unicode cannot be passed to
/// `launchctl setenv` as text and are skipped.
pub fn snapshot() -> HashMap<String, String> {
    from_vars(std::env::vars_os())
}

/// Build a snapshot from arbitrary `(name, value)` pairs.
pub fn from_vars<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut envs = HashMap::new();
    for (key, value) in vars {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => {
                envs.insert(key, value);
            }
            (key, _) => {
                tracing::debug!("Skipping non-UTF-8 environment entry: {:?}", key);
            }
        }
    }
    envs
}
