use crate::error::{ProxyError, Result};

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Canonicalize an upstream address string to `"host:port"`.
///
/// `input` may be a bare host (`something.com`), a `host:port` pair, or a
/// full `http(s)://` URL. If no scheme is present, `http://` is assumed.
/// The port defaults from the scheme (`80` for http, `443` for https) when
/// absent; any other scheme without an explicit port is rejected.
///
/// Fails with [`ProxyError::InvalidAddress`] when the input cannot be parsed
/// as a URL, or when it has no host.
pub fn normalize_address(input: &str) -> Result<String> {
    let candidate = if input.starts_with(HTTP_PREFIX) || input.starts_with(HTTPS_PREFIX) {
        input.to_string()
    } else {
        format!("{HTTP_PREFIX}{input}")
    };

    let uri: http::Uri = candidate
        .parse()
        .map_err(|e| ProxyError::InvalidAddress(format!("{input}: {e}")))?;

    let host = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ProxyError::InvalidAddress(format!("{input}: address has no host")))?;

    let port = match uri.port_u16() {
        Some(p) => p,
        None => match uri.scheme_str() {
            Some("http") => 80,
            Some("https") => 443,
            _ => {
                return Err(ProxyError::InvalidAddress(format!(
                    "{input}: no port and no default for scheme {:?}",
                    uri.scheme_str()
                )))
            }
        },
    };

    Ok(format!("{host}:{port}"))
}
