//! Node counters
//!
//! Lock-free counters updated by the game task and read by the periodic stats line.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics registry for one node
#[derive(Debug)]
pub struct Metrics {
    // Loop
    pub tick_count: AtomicU64,
    pub tick_time_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,

    // Game events
    pub paddle_bounces: AtomicU64,
    pub misses: AtomicU64,
    pub resets: AtomicU64,

    // Link traffic
    pub handoffs_sent: AtomicU64,
    pub handoffs_received: AtomicU64,
    pub paddle_updates_sent: AtomicU64,
    pub paddle_updates_received: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            paddle_bounces: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            resets: AtomicU64::new(0),
            handoffs_sent: AtomicU64::new(0),
            handoffs_received: AtomicU64::new(0),
            paddle_updates_sent: AtomicU64::new(0),
            paddle_updates_received: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record how long one cycle took
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_time_max_us.fetch_max(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// One-line summary for the periodic stats log
    pub fn summary(&self) -> String {
        format!(
            "{}s, tick {} (max {}us) | bounces {}, misses {}, resets {} | handoffs out {} in {} | paddle out {} in {}",
            self.uptime_seconds(),
            Self::get(&self.tick_count),
            Self::get(&self.tick_time_max_us),
            Self::get(&self.paddle_bounces),
            Self::get(&self.misses),
            Self::get(&self.resets),
            Self::get(&self.handoffs_sent),
            Self::get(&self.handoffs_received),
            Self::get(&self.paddle_updates_sent),
            Self::get(&self.paddle_updates_received),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
