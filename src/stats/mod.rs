//! Stats module - per-county derived series and summaries

mod calculator;

pub use calculator::{observations_for, summarize, CountySummary, DailyObservation};
