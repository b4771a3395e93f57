use dioxus::prelude::*;
use gridmap_shared::interaction::Mode;

#[component]
pub fn HelpOverlay(show: Signal<bool>, mode: Mode) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    rsx! {
        div {
            id: "help-modal",
            class: "help-overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "Help" }

                div { class: "shortcut-section",
                    h3 { "Navigation" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "+" } " / " kbd { "=" } }
                        span { "Zoom in" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "-" } " / " kbd { "_" } }
                        span { "Zoom out" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "\u{2190}" } kbd { "\u{2191}" } kbd { "\u{2192}" } kbd { "\u{2193}" } }
                        span { "Pan the map" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Esc" } }
                        span { "Close tooltips and popups" }
                    }
                }

                div { class: "help-divider" }

                div { class: "help-info-section",
                    h3 { "Map Interactions" }
                    p { "Scroll to zoom around the cursor, drag to pan, double-click to zoom in. Pinch and drag work on touch screens." }
                }

                if mode == Mode::Viewer {
                    div { class: "help-info-section",
                        h3 { "Markers" }
                        p { "Hover a port or entity for details, click it to zoom in. Use the sidebar to search and the minimap to jump anywhere." }
                    }
                    div { class: "help-info-section",
                        h3 { "Coordinates" }
                        p { "Click anywhere on the grid to see its cell, latitude and longitude, and terrain." }
                    }
                } else {
                    div { class: "help-info-section",
                        h3 { "Editing Terrain" }
                        p { "Click a sub-cell and pick Land, Water, Coastal or Unknown. Copy the JSON when you are done and save it as terrain.json." }
                    }
                }

                button {
                    id: "help-modal-close",
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}
