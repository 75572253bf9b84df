use std::{collections::HashSet, fs::File, io, io::Read, path::Path};

use chrono::{DateTime, Utc};

use crate::{
    charging::station_availability,
    models::{Station, StationSummary},
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read station catalog: {0}")]
    Io(#[from] io::Error),
    #[error("invalid station catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("station id {0} appears more than once")]
    DuplicateStation(String),
}

/// Read-only snapshot of the approved stations and their live charger status.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let stations: Vec<Station> = serde_json::from_reader(reader)?;
        Self::from_stations(stations)
    }

    pub fn from_stations(stations: Vec<Station>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(stations.len());
        for station in &stations {
            if !seen.insert(station.id.as_str()) {
                return Err(CatalogError::DuplicateStation(station.id.clone()));
            }
        }
        Ok(Self { stations })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|station| station.id == id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Every station with its charger counts and next-available estimate.
    pub fn summaries(&self, now: DateTime<Utc>) -> Vec<StationSummary> {
        self.stations
            .iter()
            .map(|station| StationSummary {
                station: station.clone(),
                availability: station_availability(&station.chargers, now),
            })
            .collect()
    }
}
