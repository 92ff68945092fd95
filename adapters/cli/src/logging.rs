//! Logger initialisation for the command-line runner.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialises the global logger.
///
/// `RUST_LOG` takes precedence. Without it, `verbose` selects debug output and
/// the default shows info level and above.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    let _ = builder.target(env_logger::Target::Stderr);

    // Fails only when a logger is already installed.
    let _ = builder.try_init();
}
