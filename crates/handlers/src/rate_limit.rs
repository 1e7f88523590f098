//! Per-category daily request budget (spec §4.4: "when a handler exceeds
//! its configured daily budget it short-circuits to a fallback message
//! instead of calling the external source").

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;

struct Counter {
    day: NaiveDate,
    count: u32,
}

pub struct DailyBudgetTracker {
    counters: DashMap<&'static str, Mutex<Counter>>,
}

impl DailyBudgetTracker {
    pub fn new() -> Self {
        Self { counters: DashMap::new() }
    }

    /// Records one request against `category`'s budget and reports whether
    /// the configured daily limit has now been exceeded.
    pub fn record_and_check(&self, category: &'static str, daily_budget: u32) -> bool {
        let today = Utc::now().date_naive();
        let entry = self
            .counters
            .entry(category)
            .or_insert_with(|| Mutex::new(Counter { day: today, count: 0 }));
        let mut counter = entry.lock();
        if counter.day != today {
            counter.day = today;
            counter.count = 0;
        }
        counter.count += 1;
        counter.count > daily_budget
    }
}

impl Default for DailyBudgetTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceeding_budget_is_reported() {
        let tracker = DailyBudgetTracker::new();
        assert!(!tracker.record_and_check("weather", 2));
        assert!(!tracker.record_and_check("weather", 2));
        assert!(tracker.record_and_check("weather", 2));
    }

    #[test]
    fn categories_are_independent() {
        let tracker = DailyBudgetTracker::new();
        assert!(!tracker.record_and_check("weather", 1));
        assert!(!tracker.record_and_check("sports", 1));
    }
}
