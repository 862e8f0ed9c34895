// ============================================================================
// Utilities Module
// Helpers for embedding the engine in a binary
// ============================================================================

/// Installs a formatting `tracing` subscriber writing events up to `level`.
///
/// Returns `false` if a global subscriber was already installed.
///
/// ```
/// auction_engine::utils::init_tracing(tracing::Level::INFO);
/// ```
#[cfg(feature = "logging")]
pub fn init_tracing(level: tracing::Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_once() {
        let first = init_tracing(tracing::Level::DEBUG);
        // A second install always fails, whichever test installed first
        assert!(!init_tracing(tracing::Level::INFO));
        let _ = first;
    }
}
