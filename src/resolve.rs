//! Country name resolution.
//!
//! Dataset labels are mapped onto geographic feature names through the alias
//! table. A feature with no record of its own falls back to the record of an
//! aggregate region listing it as a member, and otherwise has no data.

use crate::config::RegionConfig;
use crate::data::RegionRecord;
use std::collections::HashMap;

/// What a map feature's data comes from. Indices point into the records
/// the [`RegionIndex`] was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The feature has its own record
    Specific(usize),
    /// The feature borrows an aggregate region's record
    Aggregate(usize),
    NoData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub specific: usize,
    pub aggregate: usize,
    pub no_data: usize,
}

impl ResolutionSummary {
    pub fn tally(resolutions: &[Resolution]) -> Self {
        resolutions.iter().fold(Self::default(), |mut acc, r| {
            match r {
                Resolution::Specific(_) => acc.specific += 1,
                Resolution::Aggregate(_) => acc.aggregate += 1,
                Resolution::NoData => acc.no_data += 1,
            }
            acc
        })
    }
}

/// Immutable lookup from feature name to region record, built once per load
pub struct RegionIndex {
    records: Vec<RegionRecord>,
    by_name: HashMap<String, usize>,
    /// Member feature name -> index of the aggregate's record
    aggregate_of: HashMap<String, usize>,
}

impl RegionIndex {
    pub fn build(records: Vec<RegionRecord>, config: &RegionConfig) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            // Later rows replace earlier ones with the same name
            by_name.insert(config.canonical_name(&record.label).to_string(), idx);
        }

        let mut aggregate_of = HashMap::new();
        for aggregate in &config.aggregates {
            let Some(&idx) = by_name.get(config.canonical_name(&aggregate.label)) else {
                continue;
            };
            for member in &aggregate.members {
                // First listed aggregate wins for overlapping memberships
                aggregate_of.entry(member.clone()).or_insert(idx);
            }
        }

        Self {
            records,
            by_name,
            aggregate_of,
        }
    }

    pub fn resolve(&self, feature_name: &str) -> Resolution {
        if let Some(&idx) = self.by_name.get(feature_name) {
            Resolution::Specific(idx)
        } else if let Some(&idx) = self.aggregate_of.get(feature_name) {
            Resolution::Aggregate(idx)
        } else {
            Resolution::NoData
        }
    }

    pub fn resolve_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<Resolution> {
        names.into_iter().map(|name| self.resolve(name)).collect()
    }

    /// Record behind a resolution, if any
    pub fn record(&self, resolution: Resolution) -> Option<&RegionRecord> {
        match resolution {
            Resolution::Specific(idx) | Resolution::Aggregate(idx) => self.records.get(idx),
            Resolution::NoData => None,
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[RegionRecord] {
        &self.records
    }

    /// Dataset names that no feature in `feature_names` picks up directly
    pub fn unmatched<'a>(&'a self, feature_names: &[&str]) -> Vec<&'a str> {
        let mut unmatched: Vec<&str> = self
            .by_name
            .keys()
            .filter(|name| !feature_names.contains(&name.as_str()))
            .map(String::as_str)
            .collect();
        unmatched.sort_unstable();
        unmatched
    }
}
