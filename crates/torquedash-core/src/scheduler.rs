//! Tick scheduling
//!
//! Fixed-rate schedule for the two cluster ticks. The scheduler owns no timer: the
//! caller reports the current time and gets back the ticks that are due, so any event
//! loop (or a test) can drive it.

/// Kind of periodic update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    /// Simulation and gauge animation
    Fast,
    /// Telemetry logging
    Slow,
}

/// Fixed-rate schedule for fast and slow ticks
#[derive(Debug, Clone)]
pub struct TickScheduler {
    fast_period_ms: u64,
    slow_period_ms: u64,
    next_fast_ms: u64,
    next_slow_ms: u64,
}

impl TickScheduler {
    /// Create a schedule; the first tick of each kind is due at time zero
    pub fn new(fast_period_ms: u64, slow_period_ms: u64) -> Self {
        Self {
            fast_period_ms: fast_period_ms.max(1),
            slow_period_ms: slow_period_ms.max(1),
            next_fast_ms: 0,
            next_slow_ms: 0,
        }
    }

    /// Schedule from tick rates in Hz
    pub fn from_rates(fast_hz: u32, slow_hz: u32) -> Self {
        Self::new(
            1000 / u64::from(fast_hz.max(1)),
            1000 / u64::from(slow_hz.max(1)),
        )
    }

    /// Fast tick period
    pub fn fast_period_ms(&self) -> u64 {
        self.fast_period_ms
    }

    /// Slow tick period
    pub fn slow_period_ms(&self) -> u64 {
        self.slow_period_ms
    }

    /// Ticks due at `now_ms`, fast first.
    ///
    /// Each kind fires at most once per call. A caller that fell behind skips the
    /// missed periods rather than replaying them, so a stalled loop never bursts.
    pub fn due(&mut self, now_ms: u64) -> Vec<Tick> {
        let mut ticks = Vec::with_capacity(2);
        if now_ms >= self.next_fast_ms {
            ticks.push(Tick::Fast);
            self.next_fast_ms = next_deadline(self.next_fast_ms, self.fast_period_ms, now_ms);
        }
        if now_ms >= self.next_slow_ms {
            ticks.push(Tick::Slow);
            self.next_slow_ms = next_deadline(self.next_slow_ms, self.slow_period_ms, now_ms);
        }
        ticks
    }

    /// Time until the next tick of any kind
    pub fn until_next(&self, now_ms: u64) -> u64 {
        self.next_fast_ms
            .min(self.next_slow_ms)
            .saturating_sub(now_ms)
    }
}

/// First deadline on the `period` grid strictly after `now_ms`
fn next_deadline(previous: u64, period: u64, now_ms: u64) -> u64 {
    let missed = (now_ms - previous) / period;
    previous + (missed + 1) * period
}
