/// Source of the current unix time in seconds.
///
/// Evaluation functions take `now` as an argument; only the long-running
/// callers (the monitor worker, the CLI) read a clock.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
