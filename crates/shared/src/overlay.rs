use crate::dataset::MarkerSet;
use crate::grid::{
    self, GridReference, MapPoint, MapRect, CELL_HEIGHT, CELL_WIDTH, GRID_COLS, GRID_HEIGHT,
    GRID_ROWS, GRID_START_X, GRID_START_Y, GRID_WIDTH, SUBGRID_DIVISIONS, SUB_CELL_HEIGHT,
    SUB_CELL_WIDTH,
};
use crate::models::MarkerKind;
use crate::terrain::{TerrainClass, TerrainKey, TerrainStore};
use crate::viewport::{ScreenPoint, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Major,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub kind: LineKind,
}

impl GridLine {
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }
}

/// Column and row boundaries spanning the whole grid.
pub fn major_grid_lines() -> Vec<GridLine> {
    let mut lines = Vec::with_capacity(GRID_COLS + GRID_ROWS + 2);
    for col in 0..=GRID_COLS {
        let x = grid::grid_col_px(col);
        lines.push(GridLine {
            x1: x,
            y1: GRID_START_Y,
            x2: x,
            y2: GRID_START_Y + GRID_HEIGHT,
            kind: LineKind::Major,
        });
    }
    for row in 0..=GRID_ROWS {
        let y = grid::grid_row_px(row);
        lines.push(GridLine {
            x1: GRID_START_X,
            y1: y,
            x2: GRID_START_X + GRID_WIDTH,
            y2: y,
            kind: LineKind::Major,
        });
    }
    lines
}

/// Interior sub-cell boundaries of every major cell. Edges shared with the
/// major grid are skipped.
pub fn sub_grid_lines() -> Vec<GridLine> {
    let per_cell = 2 * (SUBGRID_DIVISIONS - 1);
    let mut lines = Vec::with_capacity(GRID_COLS * GRID_ROWS * per_cell);
    for col in 0..GRID_COLS {
        for row in 0..GRID_ROWS {
            let cell_x = grid::grid_col_px(col);
            let cell_y = grid::grid_row_px(row);
            for i in 1..SUBGRID_DIVISIONS {
                let x = cell_x + i as f64 * SUB_CELL_WIDTH;
                lines.push(GridLine {
                    x1: x,
                    y1: cell_y,
                    x2: x,
                    y2: cell_y + CELL_HEIGHT,
                    kind: LineKind::Sub,
                });
            }
            for i in 1..SUBGRID_DIVISIONS {
                let y = cell_y + i as f64 * SUB_CELL_HEIGHT;
                lines.push(GridLine {
                    x1: cell_x,
                    y1: y,
                    x2: cell_x + CELL_WIDTH,
                    y2: y,
                    kind: LineKind::Sub,
                });
            }
        }
    }
    lines
}

/// Sub-grid lines, built the first time they are needed and kept until
/// invalidated. Crossing the threshold afterwards only flips visibility.
#[derive(Debug, Clone, Default)]
pub struct SubGridLayer {
    lines: Option<Vec<GridLine>>,
    visible: bool,
    generation: u64,
}

impl SubGridLayer {
    /// Returns `true` if visibility changed.
    pub fn update(&mut self, scale: f64, threshold: f64) -> bool {
        let show = scale >= threshold;
        if show && self.lines.is_none() {
            self.lines = Some(sub_grid_lines());
            self.generation += 1;
        }
        let changed = show != self.visible;
        self.visible = show;
        changed
    }

    pub fn invalidate(&mut self) {
        self.lines = None;
    }

    pub fn is_built(&self) -> bool {
        self.lines.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Bumped each time the lines are rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lines(&self) -> &[GridLine] {
        self.lines.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainCell {
    pub key: TerrainKey,
    pub class: TerrainClass,
    pub rect: MapRect,
}

/// One rectangle per classified sub-cell.
pub fn terrain_cells(store: &TerrainStore) -> Vec<TerrainCell> {
    store
        .iter()
        .filter(|(_, class)| *class != TerrainClass::Unknown)
        .map(|(key, class)| TerrainCell {
            key,
            class,
            rect: grid::sub_cell_rect(&key),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Hover,
    Highlighted,
}

/// On-screen scale of a marker: emphasis times the inverse of the map scale.
pub fn marker_scale(kind: MarkerKind, emphasis: Emphasis, map_scale: f64) -> f64 {
    let boost = match (kind, emphasis) {
        (_, Emphasis::Normal) => 1.0,
        (MarkerKind::Port, Emphasis::Hover) => 1.3,
        (MarkerKind::Port, Emphasis::Highlighted) => 2.0,
        (MarkerKind::Entity, Emphasis::Hover) => 1.2,
        (MarkerKind::Entity, Emphasis::Highlighted) => 1.5,
    };
    boost / map_scale
}

/// CSS transform for a marker or label centred on its map position.
pub fn centered_transform(factor: f64) -> String {
    format!("translate(-50%, -50%) scale({factor})")
}

/// Reserved screen areas tooltips must stay clear of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeInsets {
    /// Square help button in the top-right corner.
    pub help_button: f64,
    /// Toolbar band along the bottom edge.
    pub toolbar: f64,
    pub right_margin: f64,
    pub edge_margin: f64,
    pub tooltip_width: f64,
}

impl Default for ChromeInsets {
    fn default() -> Self {
        Self {
            help_button: 80.0,
            toolbar: 100.0,
            right_margin: 30.0,
            edge_margin: 10.0,
            tooltip_width: 200.0,
        }
    }
}

/// Where to put a marker tooltip relative to its marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacement {
    /// Horizontal offset in map pixels.
    pub x_offset: f64,
    /// Vertical offset as a percentage of the tooltip height.
    pub y_percent: f64,
    pub flipped_left: bool,
    pub inverse_scale: f64,
}

impl TooltipPlacement {
    pub fn transform(&self) -> String {
        format!(
            "translate({}px, {}%) scale({})",
            self.x_offset, self.y_percent, self.inverse_scale
        )
    }
}

/// Pick a side for a marker tooltip. `anchor` is the marker centre in
/// viewport coordinates.
pub fn place_tooltip(
    viewport: &Viewport,
    anchor: ScreenPoint,
    reference: Option<&GridReference>,
    tooltip_height: f64,
    chrome: &ChromeInsets,
) -> TooltipPlacement {
    let scale = viewport.scale();
    let cfg = viewport.config();
    let scale_ratio = ((scale - cfg.min_scale) / (cfg.max_scale - cfg.min_scale)).clamp(0.0, 1.0);
    // 20px at minimum zoom down to 12px at maximum.
    let base_offset_screen = 20.0 - scale_ratio * 8.0;
    let base_offset_map = base_offset_screen / scale;
    let width_map = chrome.tooltip_width / (scale * scale);
    let height_screen = tooltip_height / scale;

    let right = viewport.width();
    let bottom = viewport.height();
    let far_right = anchor.x + base_offset_screen + chrome.tooltip_width;

    let rightmost_cols = reference.is_some_and(|r| r.major_col >= GRID_COLS - 2);
    let hits_right_edge = far_right > right - chrome.right_margin;
    let hits_help_button = anchor.y < chrome.help_button && far_right > right - chrome.help_button;

    let mut x_offset = base_offset_map;
    let mut flipped_left = false;
    if rightmost_cols || hits_right_edge || hits_help_button {
        flipped_left = true;
        x_offset = -base_offset_map - width_map;
        if rightmost_cols {
            x_offset -= width_map * scale_ratio * scale_ratio * 2.5;
        }
        if anchor.x + x_offset * scale < chrome.edge_margin {
            flipped_left = false;
            x_offset = base_offset_map;
        }
    }

    let top_rows = reference.is_some_and(|r| r.major_row < 2);
    let half = height_screen / 2.0;
    let y_percent = if top_rows && scale >= cfg.max_scale * 0.7 {
        50.0
    } else if anchor.y + half > bottom - chrome.toolbar || anchor.y + half > bottom - chrome.edge_margin {
        -100.0
    } else if anchor.y - half < chrome.edge_margin {
        0.0
    } else {
        -50.0
    };

    TooltipPlacement {
        x_offset,
        y_percent,
        flipped_left,
        inverse_scale: 1.0 / scale,
    }
}

/// Transform for the click-point coordinate tooltip.
pub fn coordinate_tooltip_transform(scale: f64) -> String {
    format!("translate({}px, -50%) scale({})", 15.0 / scale, 1.0 / scale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerToggles {
    pub ports: bool,
    pub entities: bool,
    pub grid: bool,
    pub terrain: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            ports: true,
            entities: true,
            grid: true,
            terrain: false,
        }
    }
}

/// A marker ready to draw at its map position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub id: String,
    pub kind: MarkerKind,
    pub position: MapPoint,
    pub emphasis: Emphasis,
    pub transform: String,
}

/// Everything the page needs to draw the overlays for one viewport state.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub revision: u64,
    pub surface_transform: String,
    pub inverse_scale: f64,
    pub show_grid: bool,
    pub show_sub_grid: bool,
    pub sub_grid_generation: u64,
    pub label_transform: String,
    pub markers: Vec<PlacedMarker>,
}

/// Recomputes overlay placement after every viewport or marker change.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    sub_grid: SubGridLayer,
    revision: u64,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sub_grid(&self) -> &SubGridLayer {
        &self.sub_grid
    }

    /// Drop the cached sub-grid so the next frame rebuilds it.
    pub fn invalidate_sub_grid(&mut self) {
        self.sub_grid.invalidate();
    }

    pub fn render(
        &mut self,
        viewport: &Viewport,
        markers: &MarkerSet,
        toggles: LayerToggles,
        hovered: Option<&str>,
        highlighted: Option<&str>,
    ) -> OverlayFrame {
        self.revision += 1;
        let scale = viewport.scale();
        self.sub_grid
            .update(scale, viewport.config().subgrid_threshold);

        let emphasis = |id: &str| {
            if highlighted == Some(id) {
                Emphasis::Highlighted
            } else if hovered == Some(id) {
                Emphasis::Hover
            } else {
                Emphasis::Normal
            }
        };

        let mut placed = Vec::new();
        if toggles.ports {
            for port in &markers.ports {
                let e = emphasis(&port.id);
                placed.push(PlacedMarker {
                    id: port.id.clone(),
                    kind: MarkerKind::Port,
                    position: MapPoint::new(port.x, port.y),
                    emphasis: e,
                    transform: centered_transform(marker_scale(MarkerKind::Port, e, scale)),
                });
            }
        }
        if toggles.entities {
            for entity in &markers.entities {
                let e = emphasis(&entity.id);
                placed.push(PlacedMarker {
                    id: entity.id.clone(),
                    kind: MarkerKind::Entity,
                    position: MapPoint::new(entity.x, entity.y),
                    emphasis: e,
                    transform: centered_transform(marker_scale(MarkerKind::Entity, e, scale)),
                });
            }
        }

        OverlayFrame {
            revision: self.revision,
            surface_transform: viewport.surface_transform(),
            inverse_scale: viewport.inverse_scale(),
            show_grid: toggles.grid,
            show_sub_grid: toggles.grid && self.sub_grid.is_visible(),
            sub_grid_generation: self.sub_grid.generation(),
            label_transform: centered_transform(viewport.inverse_scale()),
            markers: placed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Faction, Port};
    use crate::viewport::ViewportConfig;
    use serde_json::json;

    fn viewer() -> Viewport {
        Viewport::new(ViewportConfig::VIEWER, 1450.0, 900.0)
    }

    fn markers() -> MarkerSet {
        MarkerSet {
            ports: vec![Port {
                id: "havana".to_string(),
                city: "Havana".to_string(),
                country: "Spain".to_string(),
                faction: Faction::Spain,
                x: 1200.0,
                y: 900.0,
                description: String::new(),
            }],
            entities: vec![Entity {
                id: "ghost-ship".to_string(),
                name: "Ghost Ship".to_string(),
                x: 300.0,
                y: 300.0,
                description: String::new(),
                image: "images/default.png".to_string(),
            }],
            labels: vec![],
            last_updated: None,
        }
    }

    #[test]
    fn test_major_grid_lines() {
        let lines = major_grid_lines();
        assert_eq!(lines.len(), 19 + 17);
        assert_eq!(lines.iter().filter(|l| l.is_vertical()).count(), 19);
        let last_col = lines[GRID_COLS];
        assert!((last_col.x1 - (GRID_START_X + GRID_WIDTH)).abs() < 1e-6);
    }

    #[test]
    fn test_sub_grid_lines_per_cell() {
        let lines = sub_grid_lines();
        assert_eq!(lines.len(), GRID_COLS * GRID_ROWS * 8);
        assert!(lines.iter().all(|l| l.kind == LineKind::Sub));
        // First interior line of A1 sits one sub-cell in.
        assert!((lines[0].x1 - (GRID_START_X + SUB_CELL_WIDTH)).abs() < 1e-9);
    }

    #[test]
    fn test_sub_grid_layer_lazy_and_cached() {
        let mut layer = SubGridLayer::default();
        assert!(!layer.update(0.5, 0.9));
        assert!(!layer.is_built());
        assert!(layer.lines().is_empty());

        assert!(layer.update(1.0, 0.9));
        assert!(layer.is_built());
        assert_eq!(layer.generation(), 1);

        assert!(layer.update(0.3, 0.9));
        assert!(!layer.is_visible());
        assert!(layer.is_built());

        layer.update(2.0, 0.9);
        assert_eq!(layer.generation(), 1);

        layer.invalidate();
        layer.update(2.0, 0.9);
        assert_eq!(layer.generation(), 2);
    }

    #[test]
    fn test_terrain_cells_skip_unknown() {
        let mut store = TerrainStore::new();
        store.load(&json!({"A1-1-1": "land", "C3-2-4": "both"})).unwrap();
        let cells = terrain_cells(&store);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].key.to_string(), "A1-1-1");
        assert!((cells[0].rect.x - GRID_START_X).abs() < 1e-9);
        assert!((cells[0].rect.width - CELL_WIDTH / 5.0).abs() < 1e-9);
        let c = &cells[1];
        assert!((c.rect.x - (GRID_START_X + 2.0 * CELL_WIDTH + SUB_CELL_WIDTH)).abs() < 1e-9);
        assert!((c.rect.y - (GRID_START_Y + 2.0 * CELL_HEIGHT + 3.0 * SUB_CELL_HEIGHT)).abs() < 1e-9);
    }

    #[test]
    fn test_marker_scale() {
        assert!((marker_scale(MarkerKind::Port, Emphasis::Normal, 2.0) - 0.5).abs() < 1e-9);
        assert!((marker_scale(MarkerKind::Port, Emphasis::Highlighted, 2.0) - 1.0).abs() < 1e-9);
        assert!((marker_scale(MarkerKind::Port, Emphasis::Hover, 1.0) - 1.3).abs() < 1e-9);
        assert!((marker_scale(MarkerKind::Entity, Emphasis::Highlighted, 1.0) - 1.5).abs() < 1e-9);
        assert!((marker_scale(MarkerKind::Entity, Emphasis::Hover, 1.0) - 1.2).abs() < 1e-9);
        assert_eq!(centered_transform(0.5), "translate(-50%, -50%) scale(0.5)");
    }

    #[test]
    fn test_tooltip_default_right_and_centered() {
        let mut vp = viewer();
        vp.focus(MapPoint::new(1500.0, 1000.0), 1.0);
        let r = grid::resolve(1500.0, 1000.0);
        let p = place_tooltip(&vp, ScreenPoint::new(400.0, 450.0), r.as_ref(), 100.0, &ChromeInsets::default());
        assert!(!p.flipped_left);
        assert!(p.x_offset > 0.0);
        assert!((p.y_percent + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_tooltip_flips_near_right_edge() {
        let vp = viewer();
        let p = place_tooltip(&vp, ScreenPoint::new(vp.width() - 50.0, 450.0), None, 100.0, &ChromeInsets::default());
        assert!(p.flipped_left);
        assert!(p.x_offset < 0.0);
    }

    #[test]
    fn test_tooltip_flips_for_rightmost_columns() {
        let mut vp = viewer();
        vp.focus(MapPoint::new(3700.0, 1000.0), 1.0);
        let r = grid::resolve(3700.0, 1000.0).unwrap();
        assert_eq!(grid::col_letter(r.major_col), 'R');
        let p = place_tooltip(&vp, ScreenPoint::new(600.0, 450.0), Some(&r), 100.0, &ChromeInsets::default());
        assert!(p.flipped_left);
    }

    #[test]
    fn test_tooltip_unflips_behind_side_panel() {
        let vp = viewer();
        let r = grid::resolve(3700.0, 1000.0).unwrap();
        let p = place_tooltip(&vp, ScreenPoint::new(5.0, 450.0), Some(&r), 100.0, &ChromeInsets::default());
        assert!(!p.flipped_left);
        assert!(p.x_offset > 0.0);
    }

    #[test]
    fn test_tooltip_vertical_policy() {
        let mut vp = viewer();
        let chrome = ChromeInsets::default();
        // Near the bottom toolbar: above.
        let p = place_tooltip(&vp, ScreenPoint::new(400.0, vp.height() - 60.0), None, 100.0, &chrome);
        assert!((p.y_percent + 100.0).abs() < 1e-9);
        // Near the top edge: level.
        vp.focus(MapPoint::new(1500.0, 1000.0), 1.0);
        let p = place_tooltip(&vp, ScreenPoint::new(400.0, 20.0), None, 100.0, &chrome);
        assert!(p.y_percent.abs() < 1e-9);
        // Top rows at high zoom: below.
        vp.focus(MapPoint::new(500.0, 100.0), 4.0);
        let r = grid::resolve(500.0, 100.0).unwrap();
        let p = place_tooltip(&vp, ScreenPoint::new(400.0, 20.0), Some(&r), 100.0, &chrome);
        assert!((p.y_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_tooltip_transform() {
        assert_eq!(coordinate_tooltip_transform(0.5), "translate(30px, -50%) scale(2)");
    }

    #[test]
    fn test_render_frame() {
        let mut vp = viewer();
        let mut renderer = OverlayRenderer::new();
        let set = markers();

        let frame = renderer.render(&vp, &set, LayerToggles::default(), None, Some("havana"));
        assert_eq!(frame.revision, 1);
        assert_eq!(frame.markers.len(), 2);
        assert_eq!(frame.markers[0].emphasis, Emphasis::Highlighted);
        assert!(!frame.show_sub_grid);
        assert!(!renderer.sub_grid().is_built());

        vp.focus(MapPoint::new(1200.0, 900.0), 2.0);
        let frame = renderer.render(
            &vp,
            &set,
            LayerToggles { entities: false, ..LayerToggles::default() },
            Some("havana"),
            None,
        );
        assert_eq!(frame.revision, 2);
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].emphasis, Emphasis::Hover);
        assert!(frame.show_sub_grid);
        assert_eq!(frame.surface_transform, vp.surface_transform());
        assert_eq!(frame.label_transform, "translate(-50%, -50%) scale(0.5)");
    }
}
