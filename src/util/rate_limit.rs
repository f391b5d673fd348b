//! Per-connection throttling of arena input messages

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sustained input messages per second. Clients send at most one input per
/// rendered frame, plus the occasional toggle or ping.
pub const INPUT_RATE_LIMIT: u32 = 90;

/// Messages a client may send back to back after being idle
pub const INPUT_BURST: u32 = 30;

/// Token bucket for one socket's incoming messages
pub struct InputThrottle {
    bucket: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    dropped: AtomicU64,
}

impl InputThrottle {
    pub fn new() -> Self {
        Self::with_quota(INPUT_RATE_LIMIT, INPUT_BURST)
    }

    /// Zero rates are raised to one message
    pub fn with_quota(per_second: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        Self {
            bucket: RateLimiter::direct(Quota::per_second(rate).allow_burst(burst)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Take a token for one message. Refused messages are counted.
    pub fn admit(&self) -> bool {
        let allowed = self.bucket.check().is_ok();
        if !allowed {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        allowed
    }

    /// Messages refused since the socket opened
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for InputThrottle {
    fn default() -> Self {
        Self::new()
    }
}
