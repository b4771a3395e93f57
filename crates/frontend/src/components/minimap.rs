use dioxus::prelude::*;
use gridmap_shared::dataset::MapData;
use gridmap_shared::minimap::{self, MinimapDot, MINIMAP_HEIGHT, MINIMAP_WIDTH};
use gridmap_shared::overlay::LayerToggles;
use gridmap_shared::viewport::Viewport;

/// Static part of the thumbnail: grid outline and dots.
pub fn build_minimap_svg(dots: &[MinimapDot]) -> String {
    let outline = minimap::grid_outline();
    let mut svg = String::with_capacity(256 + dots.len() * 64);
    svg.push_str(&format!(
        r##"<rect class="mini-map-grid" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#ffffff" stroke-opacity="0.3" stroke-width="0.5"/>"##,
        outline.x, outline.y, outline.width, outline.height
    ));
    for d in dots {
        svg.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
            d.x, d.y, d.radius, d.color
        ));
    }
    svg
}

#[component]
pub fn Minimap(data: Signal<MapData>, viewport: Signal<Viewport>, toggles: Signal<LayerToggles>) -> Element {
    let content = use_memo(move || {
        let d = data.read();
        build_minimap_svg(&minimap::dots(&d.markers, &d.terrain, *toggles.read()))
    });

    let r = minimap::viewport_rect(&viewport.read());

    rsx! {
        div {
            id: "mini-map",
            class: "mini-map",
            style: "width: {MINIMAP_WIDTH}px; height: {MINIMAP_HEIGHT}px;",
            onclick: move |evt: Event<MouseData>| {
                let p = evt.element_coordinates();
                minimap::focus_from_click(&mut viewport.write(), p.x, p.y);
            },
            svg {
                width: "{MINIMAP_WIDTH}",
                height: "{MINIMAP_HEIGHT}",
                g { dangerous_inner_html: "{content}" }
                rect {
                    id: "mini-map-viewport",
                    x: "{r.x}",
                    y: "{r.y}",
                    width: "{r.width}",
                    height: "{r.height}",
                    fill: "rgba(255,255,255,0.1)",
                    stroke: "#ffd700",
                    stroke_width: "1",
                }
            }
        }
    }
}
