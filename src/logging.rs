//! Logger setup for both hosts

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global logger. Later calls are ignored.
///
/// Web: panics are routed to the browser console and `log` records go to
/// `console.*` at `level`. Native: `env_logger`, `RUST_LOG` wins over `level`.
pub fn init(level: log::Level) {
    INIT.call_once(|| {
        #[cfg(target_arch = "wasm32")]
        {
            console_error_panic_hook::set_once();
            if console_log::init_with_level(level).is_err() {
                web_sys::console::warn_1(&"logger was already installed".into());
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let default_filter = level.to_string().to_lowercase();
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(default_filter),
            )
            .try_init();
        }

        log::debug!("logging initialized");
    });
}
