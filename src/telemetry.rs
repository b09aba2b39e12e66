//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level`. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_ok() {
        tracing::debug!(
            environment = config.environment.as_str(),
            api = %config.api_base_url,
            "Tracing initialized"
        );
    }
}
