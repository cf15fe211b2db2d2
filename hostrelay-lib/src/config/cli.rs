use std::collections::HashMap;

use crate::config::{Backend, Server};
use crate::error::{ProxyError, Result};

/// Turn a list of `name=value` strings into a multimap, preserving repeats
/// under the same key. Used to build the backend table from positional CLI
/// arguments when no YAML config file is given.
fn equal_separated_to_map(items: &[String]) -> Result<HashMap<String, Vec<String>>> {
    let mut res: HashMap<String, Vec<String>> = HashMap::new();

    for item in items {
        let mut parts = item.splitn(2, '=');
        let key = parts.next().filter(|s| !s.is_empty());
        let value = parts.next();
        match (key, value) {
            (Some(k), Some(v)) => res.entry(k.to_string()).or_default().push(v.to_string()),
            _ => {
                return Err(ProxyError::Config(format!(
                    "equal-separated string ({item}) should produce a name=address pair"
                )))
            }
        }
    }

    Ok(res)
}

/// Build a backend map from `name=address` positional arguments, e.g.
/// `something.com=127.0.0.1:9000 something.com=127.0.0.1:9001`.
pub fn backends_from_equal_separated(items: &[String]) -> Result<HashMap<String, Backend>> {
    let grouped = equal_separated_to_map(items)?;

    let mut backends = HashMap::with_capacity(grouped.len());
    for (name, addresses) in grouped {
        let servers = addresses.into_iter().map(|address| Server { address }).collect();
        backends.insert(name, Backend { servers });
    }

    Ok(backends)
}

/// Build a user map from `login:password` repeatable arguments.
pub fn users_from_login_password(items: &[String]) -> Result<HashMap<String, String>> {
    let mut users = HashMap::with_capacity(items.len());
    for item in items {
        let mut parts = item.splitn(2, ':');
        let login = parts.next().filter(|s| !s.is_empty());
        let password = parts.next();
        match (login, password) {
            (Some(l), Some(p)) => {
                users.insert(l.to_string(), p.to_string());
            }
            _ => {
                return Err(ProxyError::Config(format!(
                    "--user value ({item}) should be of the form login:password"
                )))
            }
        }
    }
    Ok(users)
}
