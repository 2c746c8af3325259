//! Tracing subscriber wiring (spec §11): `stack-sage-core` is the composition
//! root, so this is where `AppConfig.verbose` turns into an `EnvFilter`.
//!
//! The binary that embeds this crate (the HTTP layer, out of scope here)
//! calls [`init_tracing`] once at startup, the way the teacher's demo
//! binaries call `tracing_subscriber::fmt().init()` from `main`.

use tracing_subscriber::EnvFilter;

use stack_sage_config::AppConfig;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` if set, falling
/// back to `debug` when `config.verbose` is set and `info` otherwise.
///
/// Uses `try_init` rather than `init` because tests build many [`AppContext`]s
/// in the same process; a second call here should be a no-op, not a panic.
pub fn init_tracing(config: &AppConfig) {
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
