use crate::grid::{self, GridReference, MapPoint, MapRect, MAP_HEIGHT, MAP_WIDTH};

/// A point in viewport pixels, relative to the viewport's own top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Tunables for one kind of map page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub initial_scale: f64,
    /// Fraction of the current scale added per zoom step.
    pub zoom_speed: f64,
    pub focus_scale: f64,
    pub double_click_factor: f64,
    /// Pixels moved per pan button / arrow key press.
    pub pan_step: f64,
    /// Fixed panel on the left that the map never sits under.
    pub side_panel_width: f64,
    pub subgrid_threshold: f64,
}

impl ViewportConfig {
    pub const VIEWER: ViewportConfig = ViewportConfig {
        min_scale: 0.25,
        max_scale: 5.0,
        initial_scale: 0.29,
        zoom_speed: 0.1,
        focus_scale: 2.0,
        double_click_factor: 1.5,
        pan_step: 100.0,
        side_panel_width: 250.0,
        subgrid_threshold: 0.9,
    };

    pub const EDITOR: ViewportConfig = ViewportConfig {
        max_scale: 15.0,
        side_panel_width: 0.0,
        ..Self::VIEWER
    };
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::VIEWER
    }
}

/// Scale and pan of the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    fn sign(self) -> f64 {
        match self {
            ZoomDirection::In => 1.0,
            ZoomDirection::Out => -1.0,
        }
    }
}

/// Pan/zoom state of the map surface. Every mutation leaves pan clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    state: ViewportState,
    config: ViewportConfig,
    window_width: f64,
    window_height: f64,
}

// ---------------------------------------------------------------------------
// Zoom / pan math (pure functions, easily testable)
// ---------------------------------------------------------------------------

/// Compute new pan offsets so that `anchor` stays over the same map point
/// when zooming from `old_scale` to `new_scale`.
pub fn zoom_pan_at_anchor(
    anchor: ScreenPoint,
    old_scale: f64,
    new_scale: f64,
    old_pan_x: f64,
    old_pan_y: f64,
) -> (f64, f64) {
    let content_x = (anchor.x - old_pan_x) / old_scale;
    let content_y = (anchor.y - old_pan_y) / old_scale;
    (
        anchor.x - content_x * new_scale,
        anchor.y - content_y * new_scale,
    )
}

/// Clamp one pan axis. A map narrower than the viewport is centred; a wider
/// one may not expose empty space on either side.
pub fn clamp_axis(pan: f64, map_extent: f64, viewport_extent: f64) -> f64 {
    if map_extent < viewport_extent {
        (viewport_extent - map_extent) / 2.0
    } else {
        pan.clamp(viewport_extent - map_extent, 0.0)
    }
}

impl Viewport {
    /// New viewport for a browser window of the given size, at the initial
    /// scale with the map centred.
    pub fn new(config: ViewportConfig, window_width: f64, window_height: f64) -> Self {
        let mut vp = Self {
            state: ViewportState {
                scale: config.initial_scale,
                pan_x: 0.0,
                pan_y: 0.0,
            },
            config,
            window_width,
            window_height,
        };
        vp.reset();
        vp
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Visible map area width, excluding the side panel.
    pub fn width(&self) -> f64 {
        (self.window_width - self.config.side_panel_width).max(0.0)
    }

    pub fn height(&self) -> f64 {
        self.window_height.max(0.0)
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width() / 2.0, self.height() / 2.0)
    }

    /// Zoom to `target` keeping the map point under `anchor` fixed.
    /// Returns `false` when the clamped scale equals the current one.
    pub fn set_zoom(&mut self, target: f64, anchor: ScreenPoint) -> bool {
        let new_scale = target.clamp(self.config.min_scale, self.config.max_scale);
        if new_scale == self.state.scale {
            return false;
        }
        let (pan_x, pan_y) = zoom_pan_at_anchor(
            anchor,
            self.state.scale,
            new_scale,
            self.state.pan_x,
            self.state.pan_y,
        );
        self.state = ViewportState {
            scale: new_scale,
            pan_x,
            pan_y,
        };
        self.clamp();
        true
    }

    /// One zoom step about the viewport centre (zoom buttons and +/- keys).
    pub fn zoom_around_center(&mut self, direction: ZoomDirection) -> bool {
        let delta = self.config.zoom_speed * direction.sign() * self.state.scale;
        self.set_zoom(self.state.scale + delta, self.center())
    }

    /// One wheel notch at the cursor. Scrolling down (positive delta) zooms out.
    pub fn zoom_wheel(&mut self, delta_y: f64, anchor: ScreenPoint) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let delta = -delta_y.signum() * self.config.zoom_speed * self.state.scale;
        self.set_zoom(self.state.scale + delta, anchor)
    }

    /// Double-click zoom at the click point.
    pub fn zoom_double_click(&mut self, anchor: ScreenPoint) -> bool {
        let target = (self.state.scale * self.config.double_click_factor).min(self.config.max_scale);
        self.set_zoom(target, anchor)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.state.pan_x += dx;
        self.state.pan_y += dy;
        self.clamp();
    }

    /// Absolute pan, used while dragging.
    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.state.pan_x = pan_x;
        self.state.pan_y = pan_y;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        let scale = self.state.scale;
        self.state.pan_x = clamp_axis(self.state.pan_x, MAP_WIDTH * scale, self.width());
        self.state.pan_y = clamp_axis(self.state.pan_y, MAP_HEIGHT * scale, self.height());
    }

    /// Centre `point` in the viewport at `scale` (range-clamped).
    pub fn focus(&mut self, point: MapPoint, scale: f64) {
        let scale = scale.clamp(self.config.min_scale, self.config.max_scale);
        self.state = ViewportState {
            scale,
            pan_x: self.width() / 2.0 - point.x * scale,
            pan_y: self.height() / 2.0 - point.y * scale,
        };
        self.clamp();
    }

    /// Back to the initial scale with the map centred.
    pub fn reset(&mut self) {
        let scale = self
            .config
            .initial_scale
            .clamp(self.config.min_scale, self.config.max_scale);
        self.state = ViewportState {
            scale,
            pan_x: (self.width() - MAP_WIDTH * scale) / 2.0,
            pan_y: (self.height() - MAP_HEIGHT * scale) / 2.0,
        };
        self.clamp();
    }

    pub fn resize(&mut self, window_width: f64, window_height: f64) {
        self.window_width = window_width;
        self.window_height = window_height;
        self.clamp();
    }

    pub fn screen_to_map(&self, p: ScreenPoint) -> MapPoint {
        MapPoint::new(
            (p.x - self.state.pan_x) / self.state.scale,
            (p.y - self.state.pan_y) / self.state.scale,
        )
    }

    pub fn map_to_screen(&self, p: MapPoint) -> ScreenPoint {
        ScreenPoint::new(
            p.x * self.state.scale + self.state.pan_x,
            p.y * self.state.scale + self.state.pan_y,
        )
    }

    /// The part of the map currently on screen, in map pixels.
    pub fn visible_map_rect(&self) -> MapRect {
        let top_left = self.screen_to_map(ScreenPoint::new(0.0, 0.0));
        MapRect {
            x: top_left.x,
            y: top_left.y,
            width: self.width() / self.state.scale,
            height: self.height() / self.state.scale,
        }
    }

    /// Grid reference under the viewport centre, for the location readout.
    pub fn center_reference(&self) -> Option<GridReference> {
        let c = self.screen_to_map(self.center());
        grid::resolve(c.x, c.y)
    }

    /// Factor that keeps an overlay a constant size on screen.
    pub fn inverse_scale(&self) -> f64 {
        1.0 / self.state.scale
    }

    /// CSS transform for the map surface (origin at its top-left).
    pub fn surface_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.state.pan_x, self.state.pan_y, self.state.scale
        )
    }

    /// Zoom label, e.g. "1.5x".
    pub fn zoom_label(&self) -> String {
        format!("{:.1}x", self.state.scale)
    }
}
