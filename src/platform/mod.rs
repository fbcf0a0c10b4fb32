//! Platform abstraction layer
//!
//! Handles browser/native differences. Storage lives with its users
//! ([`crate::progress`]); what remains here is log backend setup.

/// Install the log backend: browser console on wasm, `env_logger`
/// elsewhere. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
