//! 150x98 thumbnail of the whole map.

use crate::dataset::MarkerSet;
use crate::grid::{self, MapPoint, MapRect, MAP_HEIGHT, MAP_WIDTH};
use crate::overlay::LayerToggles;
use crate::terrain::{TerrainClass, TerrainStore};
use crate::viewport::Viewport;

pub const MINIMAP_WIDTH: f64 = 150.0;
pub const MINIMAP_HEIGHT: f64 = 98.0;

const SCALE_X: f64 = MINIMAP_WIDTH / MAP_WIDTH;
const SCALE_Y: f64 = MINIMAP_HEIGHT / MAP_HEIGHT;

const MARKER_DOT_RADIUS: f64 = 1.5;
const TERRAIN_DOT_RADIUS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapDot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
}

pub fn project(p: MapPoint) -> (f64, f64) {
    (p.x * SCALE_X, p.y * SCALE_Y)
}

pub fn unproject(x: f64, y: f64) -> MapPoint {
    MapPoint::new(x / SCALE_X, y / SCALE_Y)
}

fn project_rect(r: MapRect) -> MapRect {
    MapRect {
        x: r.x * SCALE_X,
        y: r.y * SCALE_Y,
        width: r.width * SCALE_X,
        height: r.height * SCALE_Y,
    }
}

/// Grid outline in thumbnail pixels.
pub fn grid_outline() -> MapRect {
    project_rect(grid::grid_rect())
}

/// The visible region in thumbnail pixels.
pub fn viewport_rect(viewport: &Viewport) -> MapRect {
    project_rect(viewport.visible_map_rect())
}

/// Recentre the main view on a thumbnail click.
pub fn focus_from_click(viewport: &mut Viewport, x: f64, y: f64) {
    let target = unproject(x, y);
    let scale = viewport.config().focus_scale;
    viewport.focus(target, scale);
}

pub fn terrain_color(class: TerrainClass) -> Option<&'static str> {
    match class {
        TerrainClass::Land => Some("#228B22"),
        TerrainClass::Water => Some("#4169E1"),
        TerrainClass::Both => Some("#D2B48C"),
        TerrainClass::Unknown => None,
    }
}

/// Dots for every enabled layer, drawn in order: ports, entities, terrain.
pub fn dots(markers: &MarkerSet, terrain: &TerrainStore, toggles: LayerToggles) -> Vec<MinimapDot> {
    let mut out = Vec::new();
    if toggles.ports {
        for port in &markers.ports {
            let (x, y) = project(MapPoint::new(port.x, port.y));
            out.push(MinimapDot {
                x,
                y,
                radius: MARKER_DOT_RADIUS,
                color: port.faction.color(),
            });
        }
    }
    if toggles.entities {
        for entity in &markers.entities {
            let (x, y) = project(MapPoint::new(entity.x, entity.y));
            out.push(MinimapDot {
                x,
                y,
                radius: MARKER_DOT_RADIUS,
                color: entity.color(),
            });
        }
    }
    if toggles.terrain {
        for (key, class) in terrain.iter() {
            if let Some(color) = terrain_color(class) {
                let (x, y) = project(grid::sub_cell_center(&key));
                out.push(MinimapDot {
                    x,
                    y,
                    radius: TERRAIN_DOT_RADIUS,
                    color,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faction, Port};
    use crate::viewport::ViewportConfig;
    use serde_json::json;

    #[test]
    fn test_project_corners() {
        let (x, y) = project(MapPoint::new(MAP_WIDTH, MAP_HEIGHT));
        assert!((x - MINIMAP_WIDTH).abs() < 1e-9);
        assert!((y - MINIMAP_HEIGHT).abs() < 1e-9);
        let p = unproject(75.0, 49.0);
        assert!((p.x - MAP_WIDTH / 2.0).abs() < 1e-6);
        assert!((p.y - MAP_HEIGHT / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_viewport_rect_tracks_view() {
        let mut vp = Viewport::new(ViewportConfig::VIEWER, 1450.0, 900.0);
        vp.focus(MapPoint::new(1920.0, 1249.0), 2.0);
        let r = viewport_rect(&vp);
        assert!((r.width - 600.0 * SCALE_X).abs() < 1e-6);
        assert!((r.height - 450.0 * SCALE_Y).abs() < 1e-6);
        assert!((r.center().x - 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_focus_from_click() {
        let mut vp = Viewport::new(ViewportConfig::VIEWER, 1450.0, 900.0);
        focus_from_click(&mut vp, 75.0, 49.0);
        assert!((vp.scale() - 2.0).abs() < 1e-9);
        let c = vp.screen_to_map(vp.center());
        assert!((c.x - MAP_WIDTH / 2.0).abs() < 1e-6);
        assert!((c.y - MAP_HEIGHT / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_dots_respect_toggles() {
        let markers = MarkerSet {
            ports: vec![Port {
                id: "p".to_string(),
                city: "P".to_string(),
                country: "England".to_string(),
                faction: Faction::England,
                x: 100.0,
                y: 100.0,
                description: String::new(),
            }],
            ..MarkerSet::default()
        };
        let mut terrain = TerrainStore::new();
        terrain.load(&json!({"A1-1-1": "water"})).unwrap();

        let d = dots(&markers, &terrain, LayerToggles::default());
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].color, "#ff0000");

        let all = LayerToggles {
            terrain: true,
            ..LayerToggles::default()
        };
        let d = dots(&markers, &terrain, all);
        assert_eq!(d.len(), 2);
        assert_eq!(d[1].color, "#4169E1");
        assert!((d[1].radius - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_outline_inside_thumbnail() {
        let r = grid_outline();
        assert!(r.x > 0.0 && r.y > 0.0);
        assert!(r.x + r.width > MINIMAP_WIDTH - 1e-9);
    }
}
