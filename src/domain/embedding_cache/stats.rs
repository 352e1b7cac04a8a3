//! Hit/miss counters and cost accounting

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Days used to project monthly savings from the current epoch
const DAYS_PER_MONTH: f64 = 30.0;

/// Process-wide counters for one cache epoch (reset by `clear_cache`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Accumulated cost of avoided embedding calls
    pub cost_saved: f64,
    /// Accumulated seconds of avoided generation latency
    pub time_saved: f64,
    generations: u64,
    generation_seconds: f64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Records a hit served in `lookup` time
    ///
    /// Time saved is the epoch's mean cold-generation latency minus the
    /// lookup latency, floored at zero.
    pub fn record_hit(&mut self, cost_per_request: f64, lookup: Duration) {
        self.hits += 1;
        self.cost_saved += cost_per_request.max(0.0);

        if let Some(mean) = self.mean_generation_seconds() {
            self.time_saved += (mean - lookup.as_secs_f64()).max(0.0);
        }
    }

    /// Records a full miss whose cold generation took `generation`
    pub fn record_miss(&mut self, generation: Duration) {
        self.misses += 1;
        self.generations += 1;
        self.generation_seconds += generation.as_secs_f64();
    }

    pub fn mean_generation_seconds(&self) -> Option<f64> {
        if self.generations == 0 {
            None
        } else {
            Some(self.generation_seconds / self.generations as f64)
        }
    }

    pub fn hit_rate_percent(&self) -> f64 {
        let total = self.total_requests();

        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }

    pub fn report(&self, local_cache_size: usize) -> CacheStatsReport {
        let total_requests = self.total_requests();
        let estimated_monthly_savings = if total_requests > 0 {
            round_to(self.cost_saved * DAYS_PER_MONTH, 2)
        } else {
            0.0
        };

        CacheStatsReport {
            hit_rate_percent: round_to(self.hit_rate_percent(), 2),
            total_requests,
            cache_hits: self.hits,
            cache_misses: self.misses,
            cost_saved: round_to(self.cost_saved, 4),
            time_saved: round_to(self.time_saved, 2),
            local_cache_size,
            estimated_monthly_savings,
        }
    }
}

/// Caller-facing snapshot returned by `get_stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatsReport {
    pub hit_rate_percent: f64,
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cost_saved: f64,
    pub time_saved: f64,
    pub local_cache_size: usize,
    pub estimated_monthly_savings: f64,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
