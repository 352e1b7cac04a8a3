//! Time source used for expiry checks

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Source of "now" for entry timestamps and expiry
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
