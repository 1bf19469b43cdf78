//! Log setup for the `pgmod` binary.

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Directives in this variable override the default level, e.g.
/// `PGMOD_LOG=pgmod_compiler=trace`.
pub const LOG_ENV_VAR: &str = "PGMOD_LOG";

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let directives = std::env::var(LOG_ENV_VAR).unwrap_or_default();
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose, &directives))
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .init();
    });
}

/// `warn` by default, `debug` with `--verbose`, then the user's directives.
pub fn env_filter(verbose: bool, directives: &str) -> EnvFilter {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    EnvFilter::builder()
        .with_default_directive(default.into())
        .parse_lossy(directives)
}
