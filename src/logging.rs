use tracing_subscriber::EnvFilter;

use crate::error::{Result, ToolError};

/// Installs the global stderr subscriber. `RUST_LOG` takes precedence over
/// `default_level`.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| ToolError::Logging(error.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

