use std::collections::HashMap;

use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use gridmap_shared::dataset::{MapData, MarkerSet};
use gridmap_shared::grid::{self, MapPoint, MAP_HEIGHT, MAP_WIDTH};
use gridmap_shared::interaction::{DragState, InteractionController, KeyCommand};
use gridmap_shared::minimap::terrain_color;
use gridmap_shared::models::{Entity, Faction, MarkerKind, Port, PortIcon};
use gridmap_shared::overlay::{
    self, coordinate_tooltip_transform, place_tooltip, ChromeInsets, Emphasis, GridLine, LayerToggles,
    OverlayRenderer, TerrainCell,
};
use gridmap_shared::sanitize::sanitize_dom_id;
use gridmap_shared::viewport::{ScreenPoint, Viewport};

use crate::coords;

pub const MAP_CONTAINER_ID: &str = "map-viewport";

const MAP_IMAGE: &str = "/static/images/map.webp";

/// Rough tooltip heights used for edge avoidance before the tooltip is laid out.
const TOOLTIP_HEIGHT: f64 = 90.0;
const TOOLTIP_HEIGHT_WITH_IMAGE: f64 = 170.0;

const TERRAIN_OPACITY: f64 = 0.35;

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn event_point(client_x: f64, client_y: f64) -> Option<ScreenPoint> {
    coords::client_to_viewport(client_x, client_y, MAP_CONTAINER_ID)
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Markers that pass the layer toggles. Hidden layers can't be hovered or clicked.
pub fn visible_markers(markers: &MarkerSet, toggles: LayerToggles) -> MarkerSet {
    MarkerSet {
        ports: if toggles.ports { markers.ports.clone() } else { Vec::new() },
        entities: if toggles.entities { markers.entities.clone() } else { Vec::new() },
        labels: if toggles.grid { markers.labels.clone() } else { Vec::new() },
        last_updated: markers.last_updated.clone(),
    }
}

// ---------------------------------------------------------------------------
// SVG builders (pure, tested below)
// ---------------------------------------------------------------------------

fn wrap_svg(content: &str, class: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="{class}" viewBox="0 0 {MAP_WIDTH} {MAP_HEIGHT}" width="{MAP_WIDTH}" height="{MAP_HEIGHT}" style="position:absolute;top:0;left:0;pointer-events:none;">{content}</svg>"#
    )
}

fn build_lines(svg: &mut String, lines: &[GridLine], class: &str) {
    for l in lines {
        let orientation = if l.is_vertical() { "vertical-line" } else { "horizontal-line" };
        svg.push_str(&format!(
            r#"<line class="{class} {orientation}" x1="{}" y1="{}" x2="{}" y2="{}" vector-effect="non-scaling-stroke"/>"#,
            l.x1, l.y1, l.x2, l.y2
        ));
    }
}

pub fn build_major_grid_svg() -> String {
    let lines = overlay::major_grid_lines();
    let mut svg = String::with_capacity(lines.len() * 128);
    build_lines(&mut svg, &lines, "map-grid-line major-grid");
    wrap_svg(&svg, "grid-layer")
}

pub fn build_sub_grid_svg(lines: &[GridLine]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut svg = String::with_capacity(lines.len() * 128);
    build_lines(&mut svg, lines, "map-grid-line sub-grid-line");
    wrap_svg(&svg, "sub-grid-layer")
}

pub fn build_terrain_svg(cells: &[TerrainCell]) -> String {
    let mut svg = String::with_capacity(cells.len() * 160);
    for cell in cells {
        let Some(fill) = terrain_color(cell.class) else {
            continue;
        };
        svg.push_str(&format!(
            r#"<rect class="terrain-cell {}" data-key="{}" x="{}" y="{}" width="{}" height="{}" fill="{fill}" fill-opacity="{TERRAIN_OPACITY}"/>"#,
            cell.class.as_str(),
            cell.key,
            cell.rect.x,
            cell.rect.y,
            cell.rect.width,
            cell.rect.height
        ));
    }
    wrap_svg(&svg, "terrain-layer")
}

fn icon_shape(icon: PortIcon) -> (&'static str, &'static str) {
    match icon {
        PortIcon::Anchor => (
            "0 0 48 48",
            "M24 8 A4 4 0 0 1 24 16 A4 4 0 0 1 24 8 M24 16 L24 40 M12 24 L36 24 M8 36 C8 36 12 44 24 44 C36 44 40 36 40 36",
        ),
        PortIcon::Biohazard => (
            "0 0 48 48",
            "M24 20 A4 4 0 1 0 24 28 A4 4 0 1 0 24 20 M24 6 A9 9 0 0 0 20 20 M24 6 A9 9 0 0 1 28 20 M8 36 A9 9 0 0 0 20 28 M8 36 A9 9 0 0 1 22 31 M40 36 A9 9 0 0 0 28 28 M40 36 A9 9 0 0 1 26 31",
        ),
        PortIcon::Skull => (
            "0 0 48 48",
            "M24 6 C12 6 8 14 10 24 L14 30 L14 36 L34 36 L34 30 L38 24 C40 14 36 6 24 6 Z M18 20 A3 3 0 1 0 18 26 A3 3 0 1 0 18 20 M30 20 A3 3 0 1 0 30 26 A3 3 0 1 0 30 20 M20 36 L20 42 M28 36 L28 42",
        ),
        PortIcon::Wigwam => (
            "0 0 48 48",
            "M24 4 L4 44 L12 44 L12 32 L36 32 L36 44 L44 44 Z M18 18 L30 18 L30 26 L18 26 Z",
        ),
        PortIcon::Church => (
            "0 0 48 48",
            "M24 4 L24 10 M20 7 L28 7 M20 38 L28 38 L28 28 L20 28 Z M16 18 L24 12 L32 18 L32 42 L16 42 Z",
        ),
        PortIcon::Flag => (
            "0 0 36 36",
            "M8 6 L8 42 M8 10 L28 10 L28 26 L8 26 M12 14 L24 14 L24 22 L12 22 Z",
        ),
    }
}

/// Inline SVG icon for a port of `faction`.
pub fn port_icon_svg(faction: Faction) -> String {
    let (view_box, path) = icon_shape(faction.icon());
    format!(
        r#"<svg class="map-icon {}" viewBox="{view_box}" xmlns="http://www.w3.org/2000/svg"><path d="{path}" fill="none" stroke-linecap="round" stroke-linejoin="round"/></svg>"#,
        faction.as_str()
    )
}

fn emphasis_class(e: Emphasis) -> &'static str {
    match e {
        Emphasis::Normal => "",
        Emphasis::Hover => "hovered",
        Emphasis::Highlighted => "highlighted",
    }
}

// ---------------------------------------------------------------------------
// Event plumbing shared by mouse and touch
// ---------------------------------------------------------------------------

fn handle_click(
    p: ScreenPoint,
    viewport: &mut Signal<Viewport>,
    controller: &mut Signal<InteractionController>,
    markers: &MarkerSet,
    data: &Signal<MapData>,
) {
    let data = data.read();
    controller
        .write()
        .click(&mut viewport.write(), markers, &data.terrain, p, coords::now_ms());
}

/// Tooltip for the hovered or highlighted marker.
#[derive(Debug, Clone, PartialEq)]
struct MarkerTooltip {
    position: MapPoint,
    transform: String,
    title: String,
    subtitle: String,
    description: String,
    image: Option<String>,
}

fn marker_tooltip(viewport: &Viewport, markers: &MarkerSet, id: &str) -> Option<MarkerTooltip> {
    let (position, title, subtitle, description, image) = if let Some(p) = markers.ports.iter().find(|p| p.id == id) {
        (MapPoint::new(p.x, p.y), p.city.clone(), p.country.clone(), p.description.clone(), None)
    } else {
        let e = markers.entities.iter().find(|e| e.id == id)?;
        (
            MapPoint::new(e.x, e.y),
            e.name.clone(),
            String::new(),
            e.description.clone(),
            Some(e.image.clone()),
        )
    };
    let height = if image.is_some() { TOOLTIP_HEIGHT_WITH_IMAGE } else { TOOLTIP_HEIGHT };
    let reference = grid::resolve(position.x, position.y);
    let placement = place_tooltip(
        viewport,
        viewport.map_to_screen(position),
        reference.as_ref(),
        height,
        &ChromeInsets::default(),
    );
    Some(MarkerTooltip {
        position,
        transform: placement.transform(),
        title,
        subtitle,
        description,
        image,
    })
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    viewport: Signal<Viewport>,
    data: Signal<MapData>,
    controller: Signal<InteractionController>,
    toggles: Signal<LayerToggles>,
    readout: Signal<Option<String>>,
    children: Element,
) -> Element {
    let mut renderer = use_signal(OverlayRenderer::new);

    // Pinch state: (start distance, start scale)
    let mut pinch = use_signal(|| None::<(f64, f64)>);

    let markers = use_memo(move || visible_markers(&data.read().markers, *toggles.read()));

    // Every viewport, marker or emphasis change produces a new frame.
    let frame = use_memo(move || {
        let vp = viewport.read();
        let ctrl = controller.read();
        let m = markers.read();
        renderer
            .write()
            .render(&vp, &m, *toggles.read(), ctrl.hovered(), ctrl.highlighted())
    });

    let major_grid_svg = use_memo(build_major_grid_svg);

    // Sub-grid markup is rebuilt only when the cached line set is regenerated.
    let sub_grid_generation = use_memo(move || frame.read().sub_grid_generation);
    let sub_grid_svg = use_memo(move || {
        let _generation = sub_grid_generation();
        build_sub_grid_svg(renderer.peek().sub_grid().lines())
    });

    let terrain_svg = use_memo(move || {
        if !toggles.read().terrain {
            return String::new();
        }
        build_terrain_svg(&overlay::terrain_cells(&data.read().terrain))
    });

    let tooltip = use_memo(move || {
        let ctrl = controller.read();
        let id = ctrl.highlighted().or(ctrl.hovered())?.to_string();
        marker_tooltip(&viewport.read(), &markers.read(), &id)
    });

    let f = frame.read();
    let vp = viewport.read();
    let ctrl = controller.read();
    let m = markers.read();

    let ports: HashMap<&str, &Port> = m.ports.iter().map(|p| (p.id.as_str(), p)).collect();
    let entities: HashMap<&str, &Entity> = m.entities.iter().map(|e| (e.id.as_str(), e)).collect();

    let surface_style = format!(
        "width: {MAP_WIDTH}px; height: {MAP_HEIGHT}px; transform: {}; transform-origin: 0 0;",
        f.surface_transform
    );
    let sub_grid_style = if f.show_sub_grid { "opacity: 1;" } else { "opacity: 0;" };
    let container_class = if ctrl.is_dragging() { "map-viewport dragging" } else { "map-viewport" };
    let coordinate_tooltip = ctrl.tooltip().copied();
    let scale = vp.scale();

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",
            tabindex: "0",

            onmounted: move |evt: Event<MountedData>| async move {
                let _ = evt.set_focus(true).await;
            },

            onresize: move |_evt: Event<ResizeData>| {
                if let Some((w, h)) = coords::window_size() {
                    viewport.write().resize(w, h);
                }
            },

            onkeydown: move |evt: Event<KeyboardData>| {
                if let Some(cmd) = KeyCommand::from_key(&evt.key().to_string()) {
                    evt.prevent_default();
                    controller.write().key(&mut viewport.write(), cmd);
                }
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let client = evt.data().client_coordinates();
                let Some(p) = event_point(client.x, client.y) else { return };
                let delta_y = wheel_delta_y(evt.data().delta());
                controller.write().wheel(&mut viewport.write(), delta_y, p);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                let Some(p) = event_point(client.x, client.y) else { return };
                controller.write().pointer_down(&viewport.read(), &markers.read(), p, false);
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                let Some(p) = event_point(client.x, client.y) else { return };
                if controller.read().is_dragging() {
                    controller.write().pointer_move(&mut viewport.write(), p);
                    return;
                }
                let line = {
                    let mut ctrl = controller.write();
                    ctrl.hover(&viewport.read(), &markers.read(), p);
                    ctrl.hover_readout(&viewport.read(), &data.read().terrain, p)
                };
                readout.set(line);
            },

            onmouseup: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let was_click = controller.write().pointer_up();
                if was_click {
                    let client = evt.client_coordinates();
                    if let Some(p) = event_point(client.x, client.y) {
                        handle_click(p, &mut viewport, &mut controller, &markers.read(), &data);
                    }
                }
            },

            onmouseleave: move |_| {
                controller.write().pointer_leave();
                readout.set(None);
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    let c = touches[0].client_coordinates();
                    let Some(p) = event_point(c.x, c.y) else { return };
                    controller.write().pointer_down(&viewport.read(), &markers.read(), p, true);
                } else if touches.len() >= 2 {
                    let c0 = touches[0].client_coordinates();
                    let c1 = touches[1].client_coordinates();
                    let d = ScreenPoint::new(c0.x, c0.y).distance(ScreenPoint::new(c1.x, c1.y));
                    pinch.set(Some((d, viewport.read().scale())));
                    // A second finger cancels the tap.
                    controller.write().pointer_leave();
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                let pinching = *pinch.read();
                if let Some((start_d, start_scale)) = pinching {
                    if touches.len() < 2 || start_d < 1.0 {
                        return;
                    }
                    let c0 = touches[0].client_coordinates();
                    let c1 = touches[1].client_coordinates();
                    let (Some(p0), Some(p1)) = (event_point(c0.x, c0.y), event_point(c1.x, c1.y)) else {
                        return;
                    };
                    let target = start_scale * p0.distance(p1) / start_d;
                    viewport.write().set_zoom(target, coords::midpoint(p0, p1));
                } else if touches.len() == 1 {
                    let c = touches[0].client_coordinates();
                    let Some(p) = event_point(c.x, c.y) else { return };
                    controller.write().pointer_move(&mut viewport.write(), p);
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = evt.data().touches().len();
                if pinch.read().is_some() {
                    if remaining == 0 {
                        pinch.set(None);
                    }
                    return;
                }
                if remaining > 0 {
                    return;
                }
                let start = match controller.read().drag_state() {
                    DragState::Dragging { start, .. } => Some(start),
                    DragState::Idle => None,
                };
                let was_click = controller.write().pointer_up();
                // Marker taps have no drag start; use the changed touch instead.
                let p = start.or_else(|| {
                    let c = evt.data().touches_changed().first()?.client_coordinates();
                    event_point(c.x, c.y)
                });
                if let (true, Some(p)) = (was_click, p) {
                    handle_click(p, &mut viewport, &mut controller, &markers.read(), &data);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                pinch.set(None);
                controller.write().pointer_leave();
            },

            // Everything inside moves with the map.
            div {
                class: "map-surface",
                style: "{surface_style}",

                img { class: "map-image", src: MAP_IMAGE, draggable: "false" }

                div { class: "terrain-overlay", dangerous_inner_html: "{terrain_svg}" }

                if f.show_grid {
                    div { dangerous_inner_html: "{major_grid_svg}" }
                    div { style: "{sub_grid_style}", dangerous_inner_html: "{sub_grid_svg}" }
                    for label in m.labels.iter() {
                        div {
                            class: "map-grid-label",
                            style: "left: {label.x}px; top: {label.y}px; transform: {f.label_transform};",
                            "{label.name}"
                        }
                    }
                }

                for marker in f.markers.iter().filter(|m| m.kind == MarkerKind::Port) {
                    if let Some(port) = ports.get(marker.id.as_str()) {
                        div {
                            id: "point-{sanitize_dom_id(&marker.id)}",
                            class: "map-point {port.faction} {emphasis_class(marker.emphasis)}",
                            style: "left: {marker.position.x}px; top: {marker.position.y}px; transform: {marker.transform};",
                            dangerous_inner_html: "{port_icon_svg(port.faction)}",
                        }
                    }
                }
                for marker in f.markers.iter().filter(|m| m.kind == MarkerKind::Entity) {
                    if let Some(entity) = entities.get(marker.id.as_str()) {
                        div {
                            id: "entity-{sanitize_dom_id(&marker.id)}",
                            class: "map-entity {emphasis_class(marker.emphasis)}",
                            style: "left: {marker.position.x}px; top: {marker.position.y}px; transform: {marker.transform};",
                            img { src: "/static/{entity.image}", alt: "{entity.name}", draggable: "false" }
                        }
                    }
                }

                if let Some(t) = tooltip() {
                    div {
                        class: "map-tooltip",
                        style: "left: {t.position.x}px; top: {t.position.y}px; transform: {t.transform};",
                        if let Some(image) = t.image.as_ref() {
                            div { class: "tooltip-image",
                                img { src: "/static/{image}", alt: "{t.title}" }
                            }
                        }
                        div { class: "tooltip-title", "{t.title}" }
                        if !t.subtitle.is_empty() {
                            div { class: "tooltip-subtitle", "{t.subtitle}" }
                        }
                        if !t.description.is_empty() {
                            div { class: "tooltip-description", "{t.description}" }
                        }
                    }
                }

                if let Some(ct) = coordinate_tooltip {
                    div {
                        class: "coordinate-tooltip",
                        style: "left: {ct.at.x}px; top: {ct.at.y}px; transform: {coordinate_tooltip_transform(scale)};",
                        div { class: "coord-main", "{ct.reference.key()}" }
                        div { class: "coord-latlon", "{ct.reference.format_lat_lon()}" }
                        div { class: "coord-terrain", "{ct.terrain.icon()} {ct.terrain.display_name()}" }
                    }
                }
            }

            // Screen-space children (popups) stay outside the transform.
            {children}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmap_shared::terrain::{TerrainClass, TerrainStore};
    use gridmap_shared::viewport::ViewportConfig;
    use serde_json::json;

    fn sample_markers() -> MarkerSet {
        MarkerSet {
            ports: vec![Port {
                id: "havana".to_string(),
                city: "Havana".to_string(),
                country: "Spain".to_string(),
                faction: Faction::Spain,
                x: 1200.0,
                y: 900.0,
                description: "Treasure fleet".to_string(),
            }],
            entities: vec![Entity {
                id: "ghost-ship".to_string(),
                name: "Ghost Ship".to_string(),
                x: 3700.0,
                y: 300.0,
                description: String::new(),
                image: "images/ghost.png".to_string(),
            }],
            ..MarkerSet::default()
        }
    }

    #[test]
    fn test_major_grid_svg_has_every_line() {
        let svg = build_major_grid_svg();
        assert_eq!(svg.matches("<line").count(), grid::GRID_COLS + 1 + grid::GRID_ROWS + 1);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("vector-effect=\"non-scaling-stroke\""));
    }

    #[test]
    fn test_sub_grid_svg_empty_until_built() {
        assert_eq!(build_sub_grid_svg(&[]), "");
        let lines = overlay::sub_grid_lines();
        let svg = build_sub_grid_svg(&lines);
        assert_eq!(svg.matches("sub-grid-line").count(), lines.len());
    }

    #[test]
    fn test_terrain_svg_one_rect_per_cell() {
        let mut store = TerrainStore::new();
        store
            .load(&json!({"A1-1-1": "land", "B2-2-2": "water", "C3-3-3": "both"}))
            .unwrap();
        let svg = build_terrain_svg(&overlay::terrain_cells(&store));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(r#"data-key="A1-1-1""#));
        assert!(svg.contains(r#"x="60""#));
        assert!(svg.contains("#4169E1"));
    }

    #[test]
    fn test_terrain_svg_skips_unknown() {
        let cells = vec![TerrainCell {
            key: "A1-1-1".parse().unwrap(),
            class: TerrainClass::Unknown,
            rect: grid::sub_cell_rect(&"A1-1-1".parse().unwrap()),
        }];
        assert_eq!(build_terrain_svg(&cells).matches("<rect").count(), 0);
    }

    #[test]
    fn test_port_icon_by_faction() {
        let pirate = port_icon_svg(Faction::Pirate);
        assert!(pirate.contains("map-icon pirate"));
        assert_eq!(pirate, port_icon_svg(Faction::Pirate));
        let flag = port_icon_svg(Faction::Independent);
        assert!(flag.contains(r#"viewBox="0 0 36 36""#));
        let anchor = port_icon_svg(Faction::England);
        assert!(anchor.contains(r#"viewBox="0 0 48 48""#));
    }

    #[test]
    fn test_visible_markers_follow_toggles() {
        let markers = sample_markers();
        let only_ports = LayerToggles {
            entities: false,
            ..LayerToggles::default()
        };
        let v = visible_markers(&markers, only_ports);
        assert_eq!(v.ports.len(), 1);
        assert!(v.entities.is_empty());
    }

    #[test]
    fn test_marker_tooltip_flips_in_rightmost_columns() {
        let mut vp = Viewport::new(ViewportConfig::VIEWER, 1450.0, 900.0);
        vp.focus(MapPoint::new(3700.0, 300.0), 1.0);
        let t = marker_tooltip(&vp, &sample_markers(), "ghost-ship").unwrap();
        assert_eq!(t.image.as_deref(), Some("images/ghost.png"));
        assert!(t.transform.starts_with("translate(-"));

        vp.focus(MapPoint::new(1200.0, 900.0), 1.0);
        let t = marker_tooltip(&vp, &sample_markers(), "havana").unwrap();
        assert_eq!(t.subtitle, "Spain");
        assert!(!t.transform.starts_with("translate(-"));
        assert!(marker_tooltip(&vp, &sample_markers(), "missing").is_none());
    }
}
