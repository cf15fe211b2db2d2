mod cli;
mod loader;
mod telemetry;
mod timeout;
mod types;

pub use cli::{backends_from_equal_separated, users_from_login_password};
pub use loader::load_from_path;
pub use telemetry::{LoggingConfig, TelemetryConfig};
pub use timeout::{KeepAliveConfig, TimeoutConfig};
pub use types::{Backend, Config, Server};
