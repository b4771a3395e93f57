//! Pointer, wheel and keyboard handling for the map, independent of any
//! browser event types. The page adapter feeds viewport-relative positions in
//! and draws whatever state comes out.

use thiserror::Error;

use crate::dataset::MarkerSet;
use crate::grid::{self, GridReference, MapPoint};
use crate::terrain::{TerrainClass, TerrainError, TerrainStore};
use crate::viewport::{ScreenPoint, Viewport, ZoomDirection};

/// Drag threshold in pixels. Movement below this is treated as a click.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// Touch drag threshold. Larger than mouse because touch is less precise.
pub const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Two clicks closer together than this are a double-click.
pub const DOUBLE_CLICK_MS: f64 = 300.0;

/// Marker hit radius in screen pixels.
pub const MARKER_HIT_RADIUS: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read-only map with coordinate tooltips.
    Viewer,
    /// Terrain editor: clicks open the edit popup.
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        start: ScreenPoint,
        /// Pointer position minus pan at press time.
        anchor_x: f64,
        anchor_y: f64,
        moved: bool,
    },
}

/// Read-only tooltip at a clicked map point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTooltip {
    pub at: MapPoint,
    pub reference: GridReference,
    pub terrain: TerrainClass,
}

/// Editor popup for one sub-cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditPopup {
    /// Where the popup is pinned, in viewport pixels.
    pub screen: ScreenPoint,
    pub reference: GridReference,
    pub terrain: TerrainClass,
    pub updated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Ignored,
    DoubleClickZoom,
    FocusMarker(String),
    CoordinateTooltip(CoordinateTooltip),
    EditPopup(EditPopup),
    /// Click outside the grid; open tooltips were closed.
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Escape,
    ZoomIn,
    ZoomOut,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
}

impl KeyCommand {
    /// Map a `KeyboardEvent.key` value to a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" => Some(KeyCommand::Escape),
            "+" | "=" => Some(KeyCommand::ZoomIn),
            "-" | "_" => Some(KeyCommand::ZoomOut),
            "ArrowUp" => Some(KeyCommand::PanUp),
            "ArrowDown" => Some(KeyCommand::PanDown),
            "ArrowLeft" => Some(KeyCommand::PanLeft),
            "ArrowRight" => Some(KeyCommand::PanRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("no cell selected")]
    NoSelection,
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// Find the index of the nearest position within `threshold` (Euclidean distance).
pub fn find_nearest(positions: &[ScreenPoint], click: ScreenPoint, threshold: f64) -> Option<usize> {
    let mut best_idx = None;
    let mut best_dist = threshold;
    for (i, pos) in positions.iter().enumerate() {
        let dist = pos.distance(click);
        if dist < best_dist {
            best_dist = dist;
            best_idx = Some(i);
        }
    }
    best_idx
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    mode: Mode,
    drag: DragState,
    drag_threshold: f64,
    /// Pressed on a marker: released without a drag it is still a click.
    marker_press: bool,
    last_click_ms: Option<f64>,
    hovered: Option<String>,
    highlighted: Option<String>,
    tooltip: Option<CoordinateTooltip>,
    popup: Option<EditPopup>,
    status: Option<String>,
}

impl InteractionController {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            drag: DragState::Idle,
            drag_threshold: DRAG_THRESHOLD,
            marker_press: false,
            last_click_ms: None,
            hovered: None,
            highlighted: None,
            tooltip: None,
            popup: None,
            status: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { moved: true, .. })
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Highlight a marker from outside the map (sidebar hover).
    pub fn set_highlighted(&mut self, id: Option<String>) {
        self.highlighted = id;
    }

    pub fn tooltip(&self) -> Option<&CoordinateTooltip> {
        self.tooltip.as_ref()
    }

    pub fn popup(&self) -> Option<&EditPopup> {
        self.popup.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn hide_popup(&mut self) {
        self.popup = None;
    }

    /// Close every tooltip and popup.
    pub fn dismiss(&mut self) {
        self.tooltip = None;
        self.popup = None;
        self.hovered = None;
        self.highlighted = None;
    }

    fn marker_at(&self, viewport: &Viewport, markers: &MarkerSet, p: ScreenPoint) -> Option<String> {
        let (ids, screen): (Vec<&str>, Vec<ScreenPoint>) = markers
            .positions()
            .map(|(id, at)| (id, viewport.map_to_screen(at)))
            .unzip();
        find_nearest(&screen, p, MARKER_HIT_RADIUS).map(|i| ids[i].to_string())
    }

    /// Press on the map. Presses on a marker never start a drag.
    pub fn pointer_down(
        &mut self,
        viewport: &Viewport,
        markers: &MarkerSet,
        p: ScreenPoint,
        touch: bool,
    ) -> bool {
        self.marker_press = self.marker_at(viewport, markers, p).is_some();
        if self.marker_press {
            self.drag = DragState::Idle;
            return false;
        }
        if self.mode == Mode::Editor {
            self.popup = None;
        }
        let state = viewport.state();
        self.drag_threshold = if touch { TOUCH_DRAG_THRESHOLD } else { DRAG_THRESHOLD };
        self.drag = DragState::Dragging {
            start: p,
            anchor_x: p.x - state.pan_x,
            anchor_y: p.y - state.pan_y,
            moved: false,
        };
        true
    }

    /// Pointer moved while pressed. Returns `true` when the view was panned.
    pub fn pointer_move(&mut self, viewport: &mut Viewport, p: ScreenPoint) -> bool {
        let DragState::Dragging {
            start,
            anchor_x,
            anchor_y,
            moved,
        } = self.drag
        else {
            return false;
        };
        let moved = moved || start.distance(p) > self.drag_threshold;
        self.drag = DragState::Dragging {
            start,
            anchor_x,
            anchor_y,
            moved,
        };
        if moved {
            viewport.set_pan(p.x - anchor_x, p.y - anchor_y);
        }
        moved
    }

    /// Release. Returns `true` if the press was a click rather than a drag.
    pub fn pointer_up(&mut self) -> bool {
        let was_click =
            self.marker_press || matches!(self.drag, DragState::Dragging { moved: false, .. });
        self.drag = DragState::Idle;
        self.marker_press = false;
        was_click
    }

    /// Pointer left the map.
    pub fn pointer_leave(&mut self) {
        self.drag = DragState::Idle;
        self.marker_press = false;
        self.hovered = None;
    }

    /// Wheel zoom anchored at the cursor.
    pub fn wheel(&mut self, viewport: &mut Viewport, delta_y: f64, p: ScreenPoint) -> bool {
        viewport.zoom_wheel(delta_y, p)
    }

    /// Track the marker under the pointer. Returns `true` if it changed.
    pub fn hover(&mut self, viewport: &Viewport, markers: &MarkerSet, p: ScreenPoint) -> bool {
        if self.is_dragging() {
            return false;
        }
        let hit = self.marker_at(viewport, markers, p);
        let changed = hit != self.hovered;
        self.hovered = hit;
        changed
    }

    /// Editor readout for the cell under the pointer, e.g. "A1-1-1 (land)".
    pub fn hover_readout(&self, viewport: &Viewport, terrain: &TerrainStore, p: ScreenPoint) -> Option<String> {
        if self.is_dragging() {
            return None;
        }
        let m = viewport.screen_to_map(p);
        let reference = grid::resolve(m.x, m.y)?;
        let key = reference.key();
        Some(format!("{} ({})", key, terrain.get(&key)))
    }

    /// A completed click at `p`, `now_ms` milliseconds on any monotonic clock.
    pub fn click(
        &mut self,
        viewport: &mut Viewport,
        markers: &MarkerSet,
        terrain: &TerrainStore,
        p: ScreenPoint,
        now_ms: f64,
    ) -> ClickOutcome {
        let is_double = self
            .last_click_ms
            .is_some_and(|last| now_ms - last < DOUBLE_CLICK_MS);
        self.last_click_ms = Some(now_ms);

        if is_double {
            self.tooltip = None;
            self.popup = None;
            viewport.zoom_double_click(p);
            return ClickOutcome::DoubleClickZoom;
        }

        if let Some(id) = self.marker_at(viewport, markers, p) {
            if let Some(point) = markers.find(&id) {
                let scale = viewport.config().focus_scale;
                viewport.focus(point.position(), scale);
            }
            self.tooltip = None;
            return ClickOutcome::FocusMarker(id);
        }

        let at = viewport.screen_to_map(p);
        let Some(reference) = grid::resolve(at.x, at.y) else {
            self.tooltip = None;
            self.popup = None;
            return ClickOutcome::Dismissed;
        };
        let current = terrain.get(&reference.key());

        match self.mode {
            Mode::Viewer => {
                // A marker tooltip already covers this spot.
                if self.hovered.is_some() {
                    return ClickOutcome::Ignored;
                }
                let tooltip = CoordinateTooltip {
                    at,
                    reference,
                    terrain: current,
                };
                self.tooltip = Some(tooltip);
                ClickOutcome::CoordinateTooltip(tooltip)
            }
            Mode::Editor => {
                let popup = EditPopup {
                    screen: p,
                    reference,
                    terrain: current,
                    updated: false,
                };
                self.popup = Some(popup);
                ClickOutcome::EditPopup(popup)
            }
        }
    }

    /// Apply a key. Returns `true` if the key was handled.
    pub fn key(&mut self, viewport: &mut Viewport, command: KeyCommand) -> bool {
        let step = viewport.config().pan_step;
        match command {
            KeyCommand::Escape => self.dismiss(),
            KeyCommand::ZoomIn => {
                viewport.zoom_around_center(ZoomDirection::In);
            }
            KeyCommand::ZoomOut => {
                viewport.zoom_around_center(ZoomDirection::Out);
            }
            KeyCommand::PanUp => viewport.pan(0.0, step),
            KeyCommand::PanDown => viewport.pan(0.0, -step),
            KeyCommand::PanLeft => viewport.pan(step, 0.0),
            KeyCommand::PanRight => viewport.pan(-step, 0.0),
        }
        true
    }

    /// Write `class` to the cell under the open popup. Returns the status line.
    pub fn apply_edit(&mut self, terrain: &mut TerrainStore, class: TerrainClass) -> Result<String, EditError> {
        let popup = self.popup.as_mut().ok_or(EditError::NoSelection)?;
        let key = popup.reference.key();
        terrain.set(key, class)?;
        popup.terrain = class;
        popup.updated = true;

        let status = format!("{key} set to {class}");
        tracing::debug!(%key, %class, "Terrain edited");
        self.status = Some(status.clone());
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faction, Port};
    use crate::viewport::ViewportConfig;

    fn viewer() -> (InteractionController, Viewport) {
        let mut vp = Viewport::new(ViewportConfig::VIEWER, 1450.0, 900.0);
        vp.focus(MapPoint::new(1900.0, 1200.0), 1.0);
        (InteractionController::new(Mode::Viewer), vp)
    }

    fn editor() -> (InteractionController, Viewport) {
        let mut vp = Viewport::new(ViewportConfig::EDITOR, 1200.0, 900.0);
        vp.focus(MapPoint::new(1900.0, 1200.0), 1.0);
        (InteractionController::new(Mode::Editor), vp)
    }

    fn havana() -> MarkerSet {
        MarkerSet {
            ports: vec![Port {
                id: "havana".to_string(),
                city: "Havana".to_string(),
                country: "Spain".to_string(),
                faction: Faction::Spain,
                x: 1900.0,
                y: 1200.0,
                description: String::new(),
            }],
            ..MarkerSet::default()
        }
    }

    #[test]
    fn test_key_command_mapping() {
        assert_eq!(KeyCommand::from_key("="), Some(KeyCommand::ZoomIn));
        assert_eq!(KeyCommand::from_key("_"), Some(KeyCommand::ZoomOut));
        assert_eq!(KeyCommand::from_key("ArrowLeft"), Some(KeyCommand::PanLeft));
        assert_eq!(KeyCommand::from_key("q"), None);
    }

    #[test]
    fn test_find_nearest() {
        let pts = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 0.0)];
        assert_eq!(find_nearest(&pts, ScreenPoint::new(8.0, 0.0), 5.0), Some(1));
        assert_eq!(find_nearest(&pts, ScreenPoint::new(50.0, 0.0), 5.0), None);
    }

    #[test]
    fn test_drag_pans_directly() {
        let (mut c, mut vp) = viewer();
        let markers = MarkerSet::default();
        let before = vp.state();
        assert!(c.pointer_down(&vp, &markers, ScreenPoint::new(300.0, 300.0), false));
        assert!(!c.pointer_move(&mut vp, ScreenPoint::new(301.0, 301.0)));
        assert_eq!(vp.state(), before);

        assert!(c.pointer_move(&mut vp, ScreenPoint::new(250.0, 280.0)));
        let after = vp.state();
        assert!((after.pan_x - (before.pan_x - 50.0)).abs() < 1e-9);
        assert!((after.pan_y - (before.pan_y - 20.0)).abs() < 1e-9);
        assert!(c.is_dragging());

        assert!(!c.pointer_up());
        assert_eq!(c.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_small_movement_is_click() {
        let (mut c, mut vp) = viewer();
        c.pointer_down(&vp, &MarkerSet::default(), ScreenPoint::new(300.0, 300.0), false);
        c.pointer_move(&mut vp, ScreenPoint::new(302.0, 300.0));
        assert!(c.pointer_up());
    }

    #[test]
    fn test_touch_threshold_is_wider() {
        let (mut c, mut vp) = viewer();
        c.pointer_down(&vp, &MarkerSet::default(), ScreenPoint::new(300.0, 300.0), true);
        assert!(!c.pointer_move(&mut vp, ScreenPoint::new(306.0, 300.0)));
        assert!(c.pointer_move(&mut vp, ScreenPoint::new(310.0, 300.0)));
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let (mut c, mut vp) = viewer();
        let before = vp.state();
        assert!(!c.pointer_move(&mut vp, ScreenPoint::new(10.0, 10.0)));
        assert_eq!(vp.state(), before);
        assert!(!c.pointer_up());
    }

    #[test]
    fn test_press_on_marker_does_not_drag() {
        let (mut c, vp) = viewer();
        let markers = havana();
        let on_marker = vp.map_to_screen(MapPoint::new(1900.0, 1200.0));
        assert!(!c.pointer_down(&vp, &markers, on_marker, false));
        assert_eq!(c.drag_state(), DragState::Idle);
        assert!(c.pointer_up());
    }

    #[test]
    fn test_viewer_click_shows_coordinate_tooltip() {
        let (mut c, mut vp) = viewer();
        let mut terrain = TerrainStore::new();
        let p = ScreenPoint::new(200.0, 200.0);
        let key = grid::resolve_key(vp.screen_to_map(p)).unwrap();
        terrain.set(key, TerrainClass::Water).unwrap();

        match c.click(&mut vp, &MarkerSet::default(), &terrain, p, 1000.0) {
            ClickOutcome::CoordinateTooltip(t) => {
                assert_eq!(t.reference.key(), key);
                assert_eq!(t.terrain, TerrainClass::Water);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(c.tooltip().is_some());
        c.key(&mut vp, KeyCommand::Escape);
        assert!(c.tooltip().is_none());
    }

    #[test]
    fn test_double_click_zooms_instead_of_tooltip() {
        let (mut c, mut vp) = viewer();
        let terrain = TerrainStore::new();
        let p = ScreenPoint::new(400.0, 300.0);
        let under = vp.screen_to_map(p);
        c.click(&mut vp, &MarkerSet::default(), &terrain, p, 1000.0);
        let outcome = c.click(&mut vp, &MarkerSet::default(), &terrain, p, 1200.0);
        assert_eq!(outcome, ClickOutcome::DoubleClickZoom);
        assert!((vp.scale() - 1.5).abs() < 1e-9);
        assert!(c.tooltip().is_none());
        let after = vp.screen_to_map(p);
        assert!((after.x - under.x).abs() < 1e-6);
        assert!((after.y - under.y).abs() < 1e-6);
    }

    #[test]
    fn test_slow_second_click_is_single() {
        let (mut c, mut vp) = viewer();
        let terrain = TerrainStore::new();
        let p = ScreenPoint::new(400.0, 300.0);
        c.click(&mut vp, &MarkerSet::default(), &terrain, p, 1000.0);
        let outcome = c.click(&mut vp, &MarkerSet::default(), &terrain, p, 1400.0);
        assert!(matches!(outcome, ClickOutcome::CoordinateTooltip(_)));
    }

    #[test]
    fn test_click_outside_grid_dismisses() {
        let mut vp = Viewport::new(ViewportConfig::VIEWER, 1450.0, 900.0);
        let mut c = InteractionController::new(Mode::Viewer);
        // Initial view is centred with margin; the top-left corner is off the grid.
        let outcome = c.click(&mut vp, &MarkerSet::default(), &TerrainStore::new(), ScreenPoint::new(1.0, 1.0), 0.0);
        assert_eq!(outcome, ClickOutcome::Dismissed);
    }

    #[test]
    fn test_click_marker_focuses() {
        let (mut c, mut vp) = viewer();
        let markers = havana();
        let p = vp.map_to_screen(MapPoint::new(1905.0, 1195.0));
        let outcome = c.click(&mut vp, &markers, &TerrainStore::new(), p, 0.0);
        assert_eq!(outcome, ClickOutcome::FocusMarker("havana".to_string()));
        assert!((vp.scale() - 2.0).abs() < 1e-9);
        let centre = vp.screen_to_map(vp.center());
        assert!((centre.x - 1900.0).abs() < 1e-6);
    }

    #[test]
    fn test_hover_tracks_marker_and_blocks_coordinate_tooltip() {
        let (mut c, mut vp) = viewer();
        let markers = havana();
        let on = vp.map_to_screen(MapPoint::new(1900.0, 1200.0));
        assert!(c.hover(&vp, &markers, on));
        assert_eq!(c.hovered(), Some("havana"));
        assert!(!c.hover(&vp, &markers, on));

        let elsewhere = ScreenPoint::new(on.x + 100.0, on.y);
        assert!(c.hover(&vp, &markers, elsewhere));
        assert_eq!(c.hovered(), None);

        c.hover(&vp, &markers, on);
        let outcome = c.click(&mut vp, &MarkerSet::default(), &TerrainStore::new(), elsewhere, 0.0);
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_editor_click_opens_popup_and_edit_writes_store() {
        let (mut c, mut vp) = editor();
        let mut terrain = TerrainStore::new();
        let p = ScreenPoint::new(500.0, 400.0);
        let ClickOutcome::EditPopup(popup) = c.click(&mut vp, &MarkerSet::default(), &terrain, p, 0.0) else {
            panic!("expected popup");
        };
        assert_eq!(popup.terrain, TerrainClass::Unknown);
        let key = popup.reference.key();

        let status = c.apply_edit(&mut terrain, TerrainClass::Land).unwrap();
        assert_eq!(status, format!("{key} set to land"));
        assert_eq!(terrain.get(&key), TerrainClass::Land);
        assert!(terrain.serialize().contains(&key.to_string()));
        assert!(c.popup().unwrap().updated);
        assert_eq!(c.status(), Some(status.as_str()));
    }

    #[test]
    fn test_edit_without_popup_fails() {
        let (mut c, _) = editor();
        let mut terrain = TerrainStore::new();
        assert_eq!(c.apply_edit(&mut terrain, TerrainClass::Water), Err(EditError::NoSelection));
    }

    #[test]
    fn test_editor_press_hides_popup() {
        let (mut c, mut vp) = editor();
        let terrain = TerrainStore::new();
        c.click(&mut vp, &MarkerSet::default(), &terrain, ScreenPoint::new(500.0, 400.0), 0.0);
        assert!(c.popup().is_some());
        c.pointer_down(&vp, &MarkerSet::default(), ScreenPoint::new(10.0, 10.0), false);
        assert!(c.popup().is_none());
    }

    #[test]
    fn test_hover_readout() {
        let (c, vp) = editor();
        let mut terrain = TerrainStore::new();
        let p = ScreenPoint::new(500.0, 400.0);
        let key = grid::resolve_key(vp.screen_to_map(p)).unwrap();
        terrain.set(key, TerrainClass::Both).unwrap();
        assert_eq!(c.hover_readout(&vp, &terrain, p), Some(format!("{key} (both)")));
    }

    #[test]
    fn test_keyboard_pan_and_zoom() {
        let (mut c, mut vp) = viewer();
        let before = vp.state();
        c.key(&mut vp, KeyCommand::PanLeft);
        assert!((vp.state().pan_x - (before.pan_x + 100.0)).abs() < 1e-9);
        c.key(&mut vp, KeyCommand::PanUp);
        assert!((vp.state().pan_y - (before.pan_y + 100.0)).abs() < 1e-9);
        c.key(&mut vp, KeyCommand::ZoomIn);
        assert!((vp.scale() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zooms_at_cursor() {
        let (mut c, mut vp) = viewer();
        let p = ScreenPoint::new(321.0, 222.0);
        let under = vp.screen_to_map(p);
        assert!(c.wheel(&mut vp, -100.0, p));
        let after = vp.screen_to_map(p);
        assert!((after.x - under.x).abs() < 1e-6);
        assert!((after.y - under.y).abs() < 1e-6);
    }
}
