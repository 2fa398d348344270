//! Distance Statistics
//!
//! Per-country record set and the textual report derived from it:
//! - closest / farthest country to the reference point
//! - per-country breakdown, sorted by country name
//! - invocation-weighted average distance
//!
//! `StatsRegistry` is plain data; `StatsAggregator` owns it behind a mutex.

use std::fmt::Write as _;

use crate::models::config::ReferencePoint;
use crate::models::types::{CountryStat, LookupEvent};
use crate::utils::constants::{NO_RECORD_INFORMATION_AVAILABLE_YET, REPORT_SEPARATOR};
use crate::utils::geo::estimated_distance_km;

/// Record set plus the last rendered report
#[derive(Debug, Clone)]
pub struct StatsRegistry {
    reference: ReferencePoint,
    records: Vec<CountryStat>,
    report: Option<String>,
}

impl StatsRegistry {
    pub fn new(reference: ReferencePoint) -> Self {
        Self {
            reference,
            records: Vec::new(),
            report: None,
        }
    }

    /// Fold one lookup into the record set and re-render the report.
    ///
    /// Existing countries only get their count bumped; the distance stays at
    /// the value computed the first time the country was seen.
    pub fn combine(&mut self, event: &LookupEvent) {
        match self.records.iter_mut().find(|r| r.country == event.country) {
            Some(record) => record.invoke_count += 1,
            None => {
                let distance_km = estimated_distance_km(
                    self.reference.lat,
                    self.reference.lon,
                    event.lat,
                    event.lon,
                );
                self.records.push(CountryStat {
                    country: event.country.clone(),
                    distance_km,
                    invoke_count: 1,
                });
            }
        }

        self.report = self.render();
    }

    /// Last rendered report, or the "no data" sentinel
    pub fn report(&self) -> &str {
        self.report
            .as_deref()
            .unwrap_or(NO_RECORD_INFORMATION_AVAILABLE_YET)
    }

    pub fn has_data(&self) -> bool {
        self.report.is_some()
    }

    pub fn records(&self) -> &[CountryStat] {
        &self.records
    }

    pub fn record(&self, country: &str) -> Option<&CountryStat> {
        self.records.iter().find(|r| r.country == country)
    }

    pub fn total_invocations(&self) -> u64 {
        self.records.iter().map(|r| r.invoke_count).sum()
    }

    /// Extremes are picked over the current list order, then the list is
    /// re-sorted by country for the breakdown (stable, so later ties keep
    /// that order).
    fn render(&mut self) -> Option<String> {
        let closest = closest(&self.records)?.clone();
        let farthest = farthest(&self.records)?.clone();

        self.records.sort_by(|a, b| a.country.cmp(&b.country));
        let average = average_distance(&self.records)?;

        let place = &self.reference.name;
        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Closest distance to {} queried: \n {} with an approximate distance of: {} kms",
            place, closest.country, closest.distance_km
        );
        let _ = writeln!(
            out,
            "Farthest distance to {} queried: \n {} with an approximate distance of: {} kms",
            place, farthest.country, farthest.distance_km
        );
        let _ = writeln!(out, "{}", REPORT_SEPARATOR);
        for record in &self.records {
            let _ = writeln!(
                out,
                "{} -- {} (kms) -- {} invocations",
                record.country, record.distance_km, record.invoke_count
            );
        }
        let _ = writeln!(out, "{}", REPORT_SEPARATOR);
        let _ = writeln!(out, "Average distance between requests: {} (kms)", average);

        Some(out)
    }
}

/// Smallest distance, first one wins on ties
pub fn closest(records: &[CountryStat]) -> Option<&CountryStat> {
    records.iter().reduce(|best, r| {
        if r.distance_km < best.distance_km {
            r
        } else {
            best
        }
    })
}

/// Largest distance, first one wins on ties
pub fn farthest(records: &[CountryStat]) -> Option<&CountryStat> {
    records.iter().reduce(|best, r| {
        if r.distance_km > best.distance_km {
            r
        } else {
            best
        }
    })
}

/// `sum(distance * count) / sum(count)`, truncated. `None` when nothing was counted.
pub fn average_distance(records: &[CountryStat]) -> Option<u64> {
    let (weighted, invocations) = records.iter().fold((0u128, 0u128), |(w, n), r| {
        (
            w + r.distance_km as u128 * r.invoke_count as u128,
            n + r.invoke_count as u128,
        )
    });
    weighted.checked_div(invocations).map(|avg| avg as u64)
}
