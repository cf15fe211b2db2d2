use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

const SCHEME_PREFIX: &[u8] = b"Basic ";

/// Precomputed HTTP Basic credentials, compared byte-exactly against the
/// `Authorization` header value.
///
/// Built once at startup and never reloaded (see the data model invariant
/// that the credential table is immutable after construction). An empty
/// table disables authentication: [`CredentialTable::authenticate`] is never
/// consulted for a request in that case (the caller should check
/// [`CredentialTable::is_enabled`] first).
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    entries: Vec<Vec<u8>>,
}

impl CredentialTable {
    /// Precompute `"Basic " || base64(login ":" password)` for every user.
    pub fn build(users: &HashMap<String, String>) -> Self {
        let entries = users
            .iter()
            .map(|(login, password)| {
                let plain = format!("{login}:{password}");
                let mut entry = Vec::with_capacity(SCHEME_PREFIX.len() + plain.len() * 4 / 3 + 4);
                entry.extend_from_slice(SCHEME_PREFIX);
                entry.extend_from_slice(BASE64.encode(plain.as_bytes()).as_bytes());
                entry
            })
            .collect();

        Self { entries }
    }

    /// Whether any user was configured. When false, the auth gate must be
    /// bypassed entirely rather than rejecting every request.
    pub fn is_enabled(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Byte-exact comparison against the `Authorization` header value. An
    /// empty or absent header always fails; there is no base64 decoding on
    /// the hot path.
    pub fn authenticate(&self, authorization_header: Option<&[u8]>) -> bool {
        match authorization_header {
            Some(value) if !value.is_empty() => self.entries.iter().any(|e| e == value),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(u, p)| (u.to_string(), p.to_string())).collect()
    }

    #[test]
    fn empty_table_disables_auth() {
        let table = CredentialTable::build(&HashMap::new());
        assert!(!table.is_enabled());
    }

    #[test]
    fn known_credentials_authenticate() {
        let table = CredentialTable::build(&users(&[("admin", "admin")]));
        let header = format!("Basic {}", BASE64.encode("admin:admin"));
        assert!(table.authenticate(Some(header.as_bytes())));
    }

    #[test]
    fn missing_header_fails() {
        let table = CredentialTable::build(&users(&[("admin", "admin")]));
        assert!(!table.authenticate(None));
    }

    #[test]
    fn empty_header_fails() {
        let table = CredentialTable::build(&users(&[("admin", "admin")]));
        assert!(!table.authenticate(Some(b"")));
    }

    #[test]
    fn wrong_scheme_fails() {
        let table = CredentialTable::build(&users(&[("admin", "admin")]));
        assert!(!table.authenticate(Some(b"Bearer token")));
    }

    #[test]
    fn colon_after_scheme_is_rejected() {
        // The historically buggy form; must not interoperate.
        let table = CredentialTable::build(&users(&[("admin", "admin")]));
        let header = format!("Basic: {}", BASE64.encode("admin:admin"));
        assert!(!table.authenticate(Some(header.as_bytes())));
    }
}
