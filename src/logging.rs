//! Diagnostic logging via tracing-subscriber.
//!
//! Sample output goes to stdout; everything logged here goes to stderr so the
//! two never interleave in a pipe.

use tracing_subscriber::EnvFilter;

use crate::{config::LOG_LEVEL, AiError, Result};

/// Install the global subscriber.
///
/// The filter comes from `CHAIN_SAMPLES_LOG`, then `RUST_LOG`, then `level`.
/// Calling this twice returns an error instead of panicking.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_LEVEL)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AiError::ConfigurationError {
            field: LOG_LEVEL.to_string(),
            message: format!("invalid log level '{level}': {e}"),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AiError::InternalError {
            message: format!("failed to set subscriber: {e}"),
            component: Some("logging".to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init("info");
        match init("info") {
            Err(AiError::InternalError { message, .. }) => {
                assert!(message.contains("set subscriber"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
