use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::grid::MapPoint;
use crate::models::{Entity, GridLabel, MarkerKind, PointOfInterest, Port};
use crate::sanitize::{sanitize_text, validate_entity, validate_port, MAX_NAME_LEN};
use crate::terrain::{TerrainError, TerrainStore};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("{0} must be a JSON array")]
    NotAnArray(&'static str),
    #[error("terrain rejected: {0}")]
    Terrain(#[from] TerrainError),
}

/// The four documents the map is built from, as fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDocuments {
    pub ports: Value,
    pub entities: Value,
    pub grid: Value,
    pub terrain: Value,
}

/// What a refresh admitted and what it threw away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub ports: usize,
    pub entities: usize,
    pub labels: usize,
    pub terrain_cells: usize,
    pub dropped_ports: usize,
    pub dropped_entities: usize,
}

/// Sanitized markers and labels from one refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    pub ports: Vec<Port>,
    pub entities: Vec<Entity>,
    pub labels: Vec<GridLabel>,
    /// From the `_metadata` record of `entities.json`.
    pub last_updated: Option<String>,
}

impl MarkerSet {
    /// Build from the three marker documents. Invalid records are dropped;
    /// a document of the wrong shape fails the whole set.
    pub fn from_documents(
        ports: &Value,
        entities: &Value,
        grid: &Value,
    ) -> Result<(Self, LoadReport), DataError> {
        let ports = ports.as_array().ok_or(DataError::NotAnArray("ports"))?;
        let entities = entities.as_array().ok_or(DataError::NotAnArray("entities"))?;
        let grid = grid.as_array().ok_or(DataError::NotAnArray("grid"))?;

        let valid_ports: Vec<Port> = ports.iter().filter_map(validate_port).collect();

        let mut last_updated = None;
        let mut entity_records = Vec::with_capacity(entities.len());
        for record in entities {
            if record.get("_metadata").is_some_and(|m| !is_falsy(m)) {
                last_updated = record
                    .get("lastUpdated")
                    .and_then(Value::as_str)
                    .map(|s| sanitize_text(s, MAX_NAME_LEN));
            } else {
                entity_records.push(record);
            }
        }
        let valid_entities: Vec<Entity> = entity_records
            .iter()
            .filter_map(|r| validate_entity(r))
            .collect();

        let labels: Vec<GridLabel> = grid.iter().filter_map(grid_label).collect();

        let report = LoadReport {
            ports: valid_ports.len(),
            entities: valid_entities.len(),
            labels: labels.len(),
            terrain_cells: 0,
            dropped_ports: ports.len() - valid_ports.len(),
            dropped_entities: entity_records.len() - valid_entities.len(),
        };
        if report.dropped_ports > 0 {
            tracing::warn!(dropped = report.dropped_ports, "Filtered out invalid ports");
        }
        if report.dropped_entities > 0 {
            tracing::warn!(dropped = report.dropped_entities, "Filtered out invalid entities");
        }

        Ok((
            Self {
                ports: valid_ports,
                entities: valid_entities,
                labels,
                last_updated,
            },
            report,
        ))
    }

    /// All markers, ports first.
    pub fn points(&self) -> Vec<PointOfInterest> {
        self.ports
            .iter()
            .cloned()
            .map(PointOfInterest::Port)
            .chain(self.entities.iter().cloned().map(PointOfInterest::Entity))
            .collect()
    }

    /// Markers of one kind whose name contains `term`, case-insensitively.
    pub fn search(&self, kind: MarkerKind, term: &str) -> Vec<PointOfInterest> {
        self.points()
            .into_iter()
            .filter(|p| p.kind() == kind && p.matches(term))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<PointOfInterest> {
        if let Some(port) = self.ports.iter().find(|p| p.id == id) {
            return Some(PointOfInterest::Port(port.clone()));
        }
        self.entities
            .iter()
            .find(|e| e.id == id)
            .map(|e| PointOfInterest::Entity(e.clone()))
    }

    /// Id and position of every marker, ports first, without cloning records.
    pub fn positions(&self) -> impl Iterator<Item = (&str, MapPoint)> + '_ {
        self.ports
            .iter()
            .map(|p| (p.id.as_str(), MapPoint::new(p.x, p.y)))
            .chain(
                self.entities
                    .iter()
                    .map(|e| (e.id.as_str(), MapPoint::new(e.x, e.y))),
            )
    }
}

fn is_falsy(v: &Value) -> bool {
    matches!(v, Value::Null | Value::Bool(false))
}

fn grid_label(item: &Value) -> Option<GridLabel> {
    if item.get("type").and_then(Value::as_str) == Some("label") {
        return None;
    }
    Some(GridLabel {
        name: sanitize_text(item.get("name")?.as_str()?, MAX_NAME_LEN),
        x: item.get("x")?.as_f64()?,
        y: item.get("y")?.as_f64()?,
    })
}

/// Everything the map shows that came from the data documents.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub markers: MarkerSet,
    pub terrain: TerrainStore,
}

impl MapData {
    /// Apply a fetched set of documents. Markers are swapped as a unit. A
    /// rejected terrain document leaves the previous terrain in place and is
    /// reported as an error after the markers have been applied.
    pub fn apply(&mut self, docs: &MapDocuments) -> Result<LoadReport, DataError> {
        let (markers, mut report) = MarkerSet::from_documents(&docs.ports, &docs.entities, &docs.grid)?;
        self.markers = markers;
        tracing::debug!(
            ports = report.ports,
            entities = report.entities,
            labels = report.labels,
            "Replaced marker set"
        );

        match self.terrain.load(&docs.terrain) {
            Ok(cells) => {
                report.terrain_cells = cells;
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invalid terrain data, keeping previous terrain");
                Err(e.into())
            }
        }
    }
}
