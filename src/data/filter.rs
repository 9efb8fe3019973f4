use std::collections::BTreeSet;

use super::model::StationRecord;

// ---------------------------------------------------------------------------
// Selection: which projects and instruments the user picked
// ---------------------------------------------------------------------------

/// The user's current choice of projects and instruments.
///
/// Projects keep the order they were picked in because the filtered output
/// is grouped in that order. Instruments are only ever tested for
/// membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    projects: Vec<String>,
    instruments: BTreeSet<String>,
}

impl Selection {
    pub fn new<P, I>(projects: P, instruments: I) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut selection = Selection {
            projects: Vec::new(),
            instruments: instruments.into_iter().map(Into::into).collect(),
        };
        for project in projects {
            selection.add_project(project.into());
        }
        selection
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn instruments(&self) -> &BTreeSet<String> {
        &self.instruments
    }

    pub fn has_instrument(&self, instrument: &str) -> bool {
        self.instruments.contains(instrument)
    }

    pub fn has_project(&self, project: &str) -> bool {
        self.projects.iter().any(|p| p == project)
    }

    /// Append a project; selecting it twice is a no-op.
    pub fn add_project(&mut self, project: String) {
        if !self.has_project(&project) {
            self.projects.push(project);
        }
    }

    pub fn remove_project(&mut self, project: &str) {
        self.projects.retain(|p| p != project);
    }

    pub fn clear_projects(&mut self) {
        self.projects.clear();
    }

    /// Replace the project choice, keeping the given order.
    pub fn set_projects(&mut self, projects: impl IntoIterator<Item = String>) {
        self.projects.clear();
        for project in projects {
            self.add_project(project);
        }
    }

    pub fn toggle_instrument(&mut self, instrument: &str) {
        if !self.instruments.remove(instrument) {
            self.instruments.insert(instrument.to_string());
        }
    }

    pub fn clear_instruments(&mut self) {
        self.instruments.clear();
    }

    /// Nothing picked at all: the map stays empty.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.instruments.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of stations that pass the selection.
///
/// * Nothing selected → no stations.
/// * Projects selected → stations of each project, grouped in selection
///   order, narrowed to the selected instruments if there are any.
/// * Only instruments selected → every station carrying one of them, in
///   source order.
pub fn filtered_indices(records: &[StationRecord], selection: &Selection) -> Vec<usize> {
    if selection.is_empty() {
        return Vec::new();
    }

    let instrument_ok = |rec: &StationRecord| {
        selection.instruments.is_empty() || rec.instruments.intersects(&selection.instruments)
    };

    if selection.projects.is_empty() {
        return records
            .iter()
            .enumerate()
            .filter(|(_, rec)| instrument_ok(rec))
            .map(|(i, _)| i)
            .collect();
    }

    selection
        .projects
        .iter()
        .flat_map(|project| {
            records
                .iter()
                .enumerate()
                .filter(move |(_, rec)| rec.project == *project)
        })
        .filter(|(_, rec)| instrument_ok(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Owned variant of [`filtered_indices`].
pub fn filter(records: &[StationRecord], selection: &Selection) -> Vec<StationRecord> {
    filtered_indices(records, selection)
        .into_iter()
        .map(|i| records[i].clone())
        .collect()
}
