//! Platform abstraction layer
//!
//! Key events and ticks must be stamped by the same monotonic clock, otherwise
//! the fire cooldown compares unrelated timestamps. In the browser that clock is
//! `performance.now()`, which also drives requestAnimationFrame.

/// Monotonic milliseconds (browser: `performance.now()`)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(f64::NAN)
}

/// Monotonic milliseconds since first call
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}
