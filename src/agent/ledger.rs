use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::types::CustomerId;

/// Per-customer record of the last calendar day an analysis ran.
///
/// Dates are reference-timezone calendar dates. `try_mark` is the only
/// compare-and-set: two logins racing for the same customer on the same day
/// see exactly one `true`.
#[derive(Debug, Default)]
pub struct RunLedger {
    records: DashMap<CustomerId, NaiveDate>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `day` unless it is already recorded. Returns `true` when this
    /// call claimed the day.
    pub fn try_mark(&self, customer: &CustomerId, day: NaiveDate) -> bool {
        match self.records.entry(customer.clone()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == day {
                    false
                } else {
                    entry.insert(day);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(day);
                true
            }
        }
    }

    /// Unconditionally overwrite the record
    pub fn record(&self, customer: &CustomerId, day: NaiveDate) {
        self.records.insert(customer.clone(), day);
    }

    pub fn last_run(&self, customer: &CustomerId) -> Option<NaiveDate> {
        self.records.get(customer).map(|day| *day)
    }
}
