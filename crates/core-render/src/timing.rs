//! Preview render timing.
//!
//! Holds the duration of the most recent completed preview render in
//! nanoseconds. Process wide; the last writer wins when several minimaps
//! render concurrently.
use std::sync::atomic::{AtomicU64, Ordering};

static LAST_RENDER_NS: AtomicU64 = AtomicU64::new(0);

pub fn record_last_render_ns(ns: u64) {
    LAST_RENDER_NS.store(ns, Ordering::Relaxed);
}

pub fn last_render_ns() -> u64 {
    LAST_RENDER_NS.load(Ordering::Relaxed)
}
