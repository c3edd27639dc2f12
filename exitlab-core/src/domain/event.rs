//! Entry events — the unit over which simulations and the mapper operate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A historical day whose percentile rank fell at or below the entry
/// threshold. Immutable once created.
///
/// `entry_index` is the position of the entry bar inside the bar slice the
/// event was scanned from; every derived day_index is relative to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryEvent {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_index: usize,
    pub entry_price: f64,
    pub entry_percentile: f64,
    pub threshold: f64,
}
