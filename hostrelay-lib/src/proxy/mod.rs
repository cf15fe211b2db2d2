pub mod handler;
pub mod http_result;
mod server;
mod synthetic_response;

pub use http_result::HttpError;
pub use server::{bind, run, to_response};
