//! Structured logging setup shared by obmaster binaries.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Maps a `-v` count to the default log level used when `RUST_LOG` is unset.
pub fn default_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Installs a stderr fmt subscriber. Returns `false` if one was already set.
pub fn init(verbosity: u8) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity).as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_level(0), Level::WARN);
        assert_eq!(default_level(1), Level::INFO);
        assert_eq!(default_level(5), Level::DEBUG);
    }

    #[test]
    fn second_init_is_a_no_op() {
        init(0);
        assert!(!init(2));
    }
}
