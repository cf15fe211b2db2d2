use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{ProxyError, Result};

/// Load and parse a YAML configuration file.
///
/// Performs no further validation beyond what serde enforces: an empty
/// `backends` map is a legal configuration (every `Host` simply 404s).
/// Per-server address validity is checked later, when the backend table is
/// built from this config (see [`crate::table::BackendTable::load`]).
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        ProxyError::Config(format!("failed to read config file {}: {e}", path.display()))
    })?;

    let cfg: Config = serde_norway::from_str(&text)
        .map_err(|e| ProxyError::Config(format!("failed to parse config: {e}")))?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_yaml(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp config file");
        file.write_all(contents.as_bytes()).expect("write temp config file");
        file
    }

    #[test]
    fn missing_backends_key_is_legal() {
        let file = write_yaml("port: 8080\n");
        let cfg = load_from_path(file.path()).unwrap();
        assert!(cfg.backends.is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let file = write_yaml("port: [this is not valid yaml\n");
        let err = load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_from_path("/no/such/path/hostrelay-test.yaml").unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }
}
