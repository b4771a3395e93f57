use dioxus::prelude::*;
use gridmap_shared::dataset::MapData;
use gridmap_shared::interaction::InteractionController;
use gridmap_shared::models::{MarkerKind, PointOfInterest};
use gridmap_shared::overlay::LayerToggles;
use gridmap_shared::viewport::Viewport;

use crate::components::map_view::port_icon_svg;

/// Label for a tab of the marker list.
fn tab_label(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Port => "Ports",
        MarkerKind::Entity => "Entities",
    }
}

/// Major cell and lat/lon under the viewport centre, or dashes off-grid.
pub fn location_text(viewport: &Viewport) -> (String, String) {
    match viewport.center_reference() {
        Some(r) => (r.major_label(), r.format_lat_lon()),
        None => ("--".to_string(), "--".to_string()),
    }
}

#[component]
pub fn Sidebar(
    data: Signal<MapData>,
    viewport: Signal<Viewport>,
    controller: Signal<InteractionController>,
    toggles: Signal<LayerToggles>,
    loading: ReadSignal<bool>,
) -> Element {
    let mut active_tab = use_signal(|| MarkerKind::Port);
    let mut search = use_signal(String::new);

    let items = use_memo(move || {
        data.read()
            .markers
            .search(*active_tab.read(), &search.read())
    });

    let last_updated = data.read().markers.last_updated.clone();
    let (grid_label, lat_lon) = location_text(&viewport.read());
    let current = *toggles.read();

    rsx! {
        div { class: "sidebar",
            div { class: "sidebar-header",
                h1 { "Grid Map" }
                if let Some(updated) = last_updated {
                    div { id: "last-updated", "Last Updated: {updated}" }
                }
                if loading() {
                    div { class: "loading-indicator", "Refreshing\u{2026}" }
                }
            }

            div { class: "panel current-location",
                h3 { "Current Location" }
                div { id: "location-grid", "{grid_label}" }
                div { id: "location-coords", "{lat_lon}" }
            }

            div { class: "panel search-panel",
                input {
                    id: "search-box",
                    r#type: "text",
                    placeholder: "Search\u{2026}",
                    value: "{search}",
                    oninput: move |evt: Event<FormData>| search.set(evt.value()),
                }
                if !search.read().is_empty() {
                    button {
                        id: "clear-search",
                        onclick: move |_| search.set(String::new()),
                        "\u{00d7}"
                    }
                }
            }

            div { class: "tabs",
                for kind in [MarkerKind::Port, MarkerKind::Entity] {
                    button {
                        class: if *active_tab.read() == kind { "tab-btn active" } else { "tab-btn" },
                        onclick: move |_| active_tab.set(kind),
                        "{tab_label(kind)}"
                    }
                }
            }

            div { class: "tab-content",
                for item in items.read().iter().cloned() {
                    MarkerListItem { item, viewport, controller }
                }
                if items.read().is_empty() {
                    div { class: "empty-list", "No matches" }
                }
            }

            div { class: "panel toggle-controls",
                h3 { "Layers" }
                LayerToggle {
                    id: "toggle-ports",
                    label: "Ports",
                    checked: current.ports,
                    on_toggle: move |on| toggles.write().ports = on,
                }
                LayerToggle {
                    id: "toggle-entities",
                    label: "Entities",
                    checked: current.entities,
                    on_toggle: move |on| toggles.write().entities = on,
                }
                LayerToggle {
                    id: "toggle-gridlines",
                    label: "Grid lines",
                    checked: current.grid,
                    on_toggle: move |on| toggles.write().grid = on,
                }
                LayerToggle {
                    id: "toggle-terrain",
                    label: "Terrain",
                    checked: current.terrain,
                    on_toggle: move |on| toggles.write().terrain = on,
                }
            }
        }
    }
}

#[component]
fn MarkerListItem(
    item: PointOfInterest,
    viewport: Signal<Viewport>,
    controller: Signal<InteractionController>,
) -> Element {
    let hover_id = item.id().to_string();
    let position = item.position();

    rsx! {
        div {
            class: "port-item",
            onmouseenter: move |_| controller.write().set_highlighted(Some(hover_id.clone())),
            onmouseleave: move |_| controller.write().set_highlighted(None),
            onclick: move |_| {
                let scale = viewport.read().config().focus_scale;
                viewport.write().focus(position, scale);
            },
            if let PointOfInterest::Port(port) = &item {
                span { class: "sidebar-icon", dangerous_inner_html: "{port_icon_svg(port.faction)}" }
            }
            if let PointOfInterest::Entity(entity) = &item {
                img { class: "sidebar-icon", src: "/static/{entity.image}", alt: "{entity.name}" }
            }
            span { class: "item-name", " {item.display_name()}" }
            if !item.subtitle().is_empty() {
                span { class: "item-subtitle", "{item.subtitle()}" }
            }
        }
    }
}

#[component]
fn LayerToggle(id: &'static str, label: &'static str, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        label { class: "layer-toggle",
            input {
                id,
                r#type: "checkbox",
                checked,
                onchange: move |evt: Event<FormData>| on_toggle.call(evt.checked()),
            }
            "{label}"
        }
    }
}
