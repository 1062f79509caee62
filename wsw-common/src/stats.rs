//! Report collection statistics
//!
//! Pure reductions over the full persisted report set. The summary is always rebuilt from a
//! complete snapshot; nothing here is incremental and nothing here mutates reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::report::{Coordinates, Report, StrikeStatus};

/// Number of species retained in the ranking
pub const TOP_SPECIES_LIMIT: usize = 5;

/// Bucket for species text that normalizes to nothing
pub const UNKNOWN_SPECIES_KEY: &str = "unknown species";

/// One ranked species bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCount {
    pub species: String,
    pub count: usize,
}

/// Aggregate view of all persisted reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    /// Total number of reports
    pub total: usize,
    /// Report count per status key ("dead", "stunned", "injured", "unknown")
    pub by_status: BTreeMap<String, usize>,
    /// Report count per normalized species key
    pub by_species: BTreeMap<String, usize>,
    /// Species ranked by count, ties in first-encountered order, at most five
    pub top_species: Vec<SpeciesCount>,
}

impl StatisticsSummary {
    pub fn display_string(&self) -> String {
        match self.top_species.first() {
            Some(top) => format!(
                "{} reports, most often {} ({})",
                self.total, top.species, top.count
            ),
            None => format!("{} reports", self.total),
        }
    }
}

/// Reduce species text to its grouping key
///
/// Everything before the first `(` is kept and trimmed, so `"五色鳥 (95%)"` and
/// `"五色鳥 (60%)"` share the key `"五色鳥"`. Blank results map to [`UNKNOWN_SPECIES_KEY`].
pub fn normalize_species(species: &str) -> String {
    let head = match species.find('(') {
        Some(idx) => &species[..idx],
        None => species,
    };
    let key = head.trim();
    if key.is_empty() {
        UNKNOWN_SPECIES_KEY.to_string()
    } else {
        key.to_string()
    }
}

/// Summarize a report collection
///
/// Returns `None` for an empty collection.
pub fn summarize(reports: &[Report]) -> Option<StatisticsSummary> {
    if reports.is_empty() {
        return None;
    }

    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    // Species buckets in first-encountered order; the index map keeps lookups O(1)
    let mut species_order: Vec<SpeciesCount> = Vec::new();
    let mut species_index: HashMap<String, usize> = HashMap::new();

    for report in reports {
        *by_status
            .entry(report.status.as_str().to_string())
            .or_insert(0) += 1;

        let key = normalize_species(&report.bird_species);
        match species_index.get(&key) {
            Some(&idx) => species_order[idx].count += 1,
            None => {
                species_index.insert(key.clone(), species_order.len());
                species_order.push(SpeciesCount {
                    species: key,
                    count: 1,
                });
            }
        }
    }

    let by_species = species_order
        .iter()
        .map(|s| (s.species.clone(), s.count))
        .collect();

    // sort_by is stable, so equal counts keep input order
    let mut top_species = species_order;
    top_species.sort_by(|a, b| b.count.cmp(&a.count));
    top_species.truncate(TOP_SPECIES_LIMIT);

    Some(StatisticsSummary {
        total: reports.len(),
        by_status,
        by_species,
        top_species,
    })
}

/// Report reduced to what a map marker needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub id: Uuid,
    pub species: String,
    pub status: StrikeStatus,
    pub coordinates: Coordinates,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Map markers for every report that carries a location, in input order
pub fn map_points(reports: &[Report]) -> Vec<MapPoint> {
    reports
        .iter()
        .filter_map(|r| {
            r.location.map(|coordinates| MapPoint {
                id: r.id,
                species: normalize_species(&r.bird_species),
                status: r.status,
                coordinates,
                photo_url: r.photo_url.clone(),
                created_at: r.created_at,
            })
        })
        .collect()
}
