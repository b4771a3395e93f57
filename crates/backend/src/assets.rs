use std::path::Path;

use gridmap_shared::dataset::{LoadReport, MapData, MapDocuments};
use serde_json::Value;

/// File names of the documents served under `/data`.
pub const DATA_FILES: [&str; 4] = ["ports.json", "entities.json", "grid.json", "terrain.json"];

fn read_document(data_dir: &Path, file_name: &str) -> Result<Value, String> {
    let path = data_dir.join(file_name);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse {}: {}", file_name, e))
}

/// Read the four data documents from `data_dir`.
pub fn load_documents(data_dir: &Path) -> Result<MapDocuments, String> {
    let [ports, entities, grid, terrain] = DATA_FILES;
    Ok(MapDocuments {
        ports: read_document(data_dir, ports)?,
        entities: read_document(data_dir, entities)?,
        grid: read_document(data_dir, grid)?,
        terrain: read_document(data_dir, terrain)?,
    })
}

/// Run the documents through the same validation the page applies, so a
/// broken file shows up in the server log before any browser loads it.
pub fn check_documents(data_dir: &Path) -> Result<LoadReport, String> {
    let docs = load_documents(data_dir)?;
    let report = MapData::default().apply(&docs).map_err(|e| e.to_string())?;

    tracing::info!(
        ports = report.ports,
        entities = report.entities,
        labels = report.labels,
        terrain_cells = report.terrain_cells,
        "Loaded map data"
    );
    if report.dropped_ports + report.dropped_entities > 0 {
        tracing::warn!(
            dropped_ports = report.dropped_ports,
            dropped_entities = report.dropped_entities,
            "Some records will be hidden from the map"
        );
    }
    Ok(report)
}
