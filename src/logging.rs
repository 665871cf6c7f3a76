//! Log output for native builds.

/// Installs a `tracing` subscriber writing to stdout and routes panics through it.
///
/// `RUST_LOG` takes precedence over `filter`. Only the first call has an effect.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(filter: &str) {
    use std::sync::Once;

    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        let _ = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .without_time()
            .with_target(false)
            .try_init();

        std::panic::set_hook(Box::new(tracing_panic::panic_hook));
    });
}

/// Browsers have no stdout: only panics are forwarded, to the console.
#[cfg(target_arch = "wasm32")]
pub fn init(_filter: &str) {
    #[cfg(feature = "web")]
    brook_web::install_panic_hook();
}
