//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter implied by `-v`/`-q` counts, `None` when neither was given.
pub fn filter_directive(verbose: u8, quiet: u8) -> Option<&'static str> {
    match (verbose, quiet) {
        (0, 0) => None,
        (0, 1) => Some("warn"),
        (0, _) => Some("error"),
        (1, _) => Some("debug"),
        _ => Some("trace"),
    }
}

/// Install the fmt subscriber on stderr.
///
/// `-v`/`-q` win over `RUST_LOG`, which wins over the `info` default.
/// Records from the `log` facade are bridged in.
pub fn init_logging(verbose: u8, quiet: u8) {
    let filter = match filter_directive(verbose, quiet) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(0, 0), None);
        assert_eq!(filter_directive(1, 0), Some("debug"));
        assert_eq!(filter_directive(3, 0), Some("trace"));
        assert_eq!(filter_directive(0, 1), Some("warn"));
        assert_eq!(filter_directive(0, 2), Some("error"));
    }
}
