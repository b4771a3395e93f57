pub mod editor;
pub mod viewer;

use dioxus::prelude::*;
use gridmap_shared::dataset::{LoadReport, MapData};
use gridmap_shared::interaction::InteractionController;

use crate::api;

/// Window size used when the real one can't be read yet.
pub const DEFAULT_WINDOW: (f64, f64) = (1280.0, 800.0);

/// Fetch the data documents and apply them. Nothing is applied when the
/// fetch fails; a rejected terrain document still lets the markers through.
pub async fn refresh(mut data: Signal<MapData>) -> Result<LoadReport, String> {
    let docs = api::fetch_documents().await?;
    data.write().apply(&docs).map_err(|e| e.to_string())
}

/// Status line after a refresh attempt.
pub fn refresh_status(result: &Result<LoadReport, String>) -> Option<String> {
    match result {
        Ok(report) if report.dropped_ports + report.dropped_entities > 0 => Some(format!(
            "Skipped {} invalid ports and {} invalid entities",
            report.dropped_ports, report.dropped_entities
        )),
        Ok(_) => None,
        Err(e) => Some(format!("Error loading map data: {}", e)),
    }
}

/// Replace the status line with the outcome of the latest refresh. A clean
/// refresh clears an earlier error.
pub fn show_refresh_status(controller: &mut InteractionController, result: &Result<LoadReport, String>) {
    match refresh_status(result) {
        Some(status) => controller.set_status(status),
        None => controller.clear_status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmap_shared::interaction::Mode;

    #[test]
    fn test_refresh_status() {
        assert_eq!(refresh_status(&Ok(LoadReport::default())), None);

        let dropped = LoadReport {
            dropped_ports: 2,
            ..LoadReport::default()
        };
        assert_eq!(
            refresh_status(&Ok(dropped)).as_deref(),
            Some("Skipped 2 invalid ports and 0 invalid entities")
        );
        assert_eq!(
            refresh_status(&Err("HTTP 404".to_string())).as_deref(),
            Some("Error loading map data: HTTP 404")
        );
    }

    #[test]
    fn test_clean_refresh_clears_earlier_error() {
        let mut controller = InteractionController::new(Mode::Viewer);

        show_refresh_status(&mut controller, &Err("HTTP 503".to_string()));
        assert_eq!(controller.status(), Some("Error loading map data: HTTP 503"));

        show_refresh_status(&mut controller, &Ok(LoadReport::default()));
        assert_eq!(controller.status(), None);

        let dropped = LoadReport {
            dropped_entities: 1,
            ..LoadReport::default()
        };
        show_refresh_status(&mut controller, &Ok(dropped));
        assert_eq!(controller.status(), Some("Skipped 0 invalid ports and 1 invalid entities"));
    }
}
