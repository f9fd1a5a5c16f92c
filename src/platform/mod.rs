//! Platform abstraction layer
//!
//! Host capabilities the simulation talks to without depending on a browser:
//! - Haptic feedback sink
//! - Logger setup for native and web builds

pub mod feedback;

pub use feedback::{FeedbackCue, FeedbackSink, NoFeedback, RecordingFeedback};

/// Install the platform logger (env_logger natively, console on the web)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    // A second init (tests, embedding hosts) is not an error worth reporting
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
