//! Structured logging initialization.

use crate::error::AppResult;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset: info everywhere, debug for the
/// workspace crates. Targets use crate names, so underscores.
const DEFAULT_DIRECTIVES: &str =
    "info,nivesh_core=debug,nivesh_ingest=debug,nivesh_store=debug,nivesh_collector=debug";

/// Initialize structured logging.
///
/// JSON output for production (`RUST_ENV=production`), pretty output
/// otherwise.
pub fn init_logging() -> AppResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse_and_target_real_crates() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
        for target in [
            "nivesh_core",
            "nivesh_ingest",
            "nivesh_store",
            "nivesh_collector",
        ] {
            assert!(DEFAULT_DIRECTIVES.contains(&format!("{target}=debug")));
        }
    }
}
