use log::{debug, warn};
use serde::{Deserialize, Deserializer};

use crate::upstream::UpstreamError;

/// Query each instance in order, returning the first answer. Failures are
/// logged and skipped; `None` means every instance failed.
pub fn first_success<T, F>(instances: &[String], mut attempt: F) -> Option<T>
where
    F: FnMut(&str) -> Result<T, UpstreamError>,
{
    for instance in instances {
        match attempt(instance) {
            Ok(data) => {
                debug!("Got answer from {}", instance);
                return Some(data);
            }
            Err(e) => {
                debug!("Skipping instance {}: {}", instance, e);
            }
        }
    }
    warn!("All {} instances failed", instances.len());
    None
}

/// Log and discard an upstream failure
pub fn absorb<T>(what: &str, result: Result<T, UpstreamError>) -> Option<T> {
    match result {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("No {} available: {}", what, e);
            None
        }
    }
}

/// Accept a string, a number or null as display text. Upstreams are not
/// consistent about which they send for counts.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Null => "".into(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Like `lenient_string` but null becomes `None`
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Integer counts, tolerating null and numeric strings
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
