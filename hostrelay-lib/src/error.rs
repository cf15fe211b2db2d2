use thiserror::Error;

/// Errors that can occur while loading configuration or running the proxy.
///
/// Errors surfaced while *handling* a request never reach this type: the
/// response status code is the error channel there (see
/// [`crate::handler::HttpError`]).
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("bind failed: {0}")]
    Bind(std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
