use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Instruments – the set of instrument types deployed at a station
// ---------------------------------------------------------------------------

/// Instrument types recorded for one station, e.g. `{"CTD", "TSG"}`.
///
/// Kept in a `BTreeSet` so display order and equality do not depend on the
/// order the source listed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Instruments(BTreeSet<String>);

impl Instruments {
    /// Split a raw cell such as `"CTD, TSG"` or `"Niskin Bottle;Bongo"`.
    pub fn parse(raw: &str) -> Self {
        raw.split([',', ';', '/', '|'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True when at least one instrument is also in `wanted`.
    pub fn intersects(&self, wanted: &BTreeSet<String>) -> bool {
        self.0.iter().any(|i| wanted.contains(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for Instruments {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Instruments(iter.into_iter().collect())
    }
}

impl fmt::Display for Instruments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(", "))
    }
}

// ---------------------------------------------------------------------------
// StationRecord – one row of the station table
// ---------------------------------------------------------------------------

/// A single sampling station (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub project: String,
    pub station: String,
    pub platform: String,
    pub instruments: Instruments,
    /// Decimal degrees, negative south of the equator.
    pub lat: f64,
    /// Decimal degrees, negative west of Greenwich.
    pub lon: f64,
}

// ---------------------------------------------------------------------------
// StationDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed station table. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct StationDataset {
    /// All stations in source order.
    pub records: Vec<StationRecord>,
    /// Distinct project names in first-seen order.
    project_names: Vec<String>,
    /// Distinct instrument types, sorted.
    instrument_types: BTreeSet<String>,
}

impl StationDataset {
    /// Build the project and instrument indices from the loaded records.
    pub fn from_records(records: Vec<StationRecord>) -> Self {
        let mut project_names: Vec<String> = Vec::new();
        let mut instrument_types = BTreeSet::new();

        for rec in &records {
            if !project_names.contains(&rec.project) {
                project_names.push(rec.project.clone());
            }
            instrument_types.extend(rec.instruments.iter().map(str::to_string));
        }

        StationDataset {
            records,
            project_names,
            instrument_types,
        }
    }

    pub fn project_names(&self) -> &[String] {
        &self.project_names
    }

    pub fn instrument_types(&self) -> &BTreeSet<String> {
        &self.instrument_types
    }

    /// Projects with at least one station carrying any of `instruments`,
    /// in first-seen order.
    pub fn projects_with_instruments(&self, instruments: &BTreeSet<String>) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for rec in &self.records {
            if rec.instruments.intersects(instruments) && !found.contains(&rec.project) {
                found.push(rec.project.clone());
            }
        }
        found
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
