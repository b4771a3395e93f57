use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use gridmap_shared::dataset::MapData;
use gridmap_shared::interaction::InteractionController;
use gridmap_shared::terrain::{TerrainClass, TerrainCounts};
use gridmap_shared::viewport::Viewport;

use crate::api;

/// How long the popup stays up after an edit.
const POPUP_HIDE_MS: u32 = 3_000;

pub const COPIED_STATUS: &str = "JSON copied to clipboard!";

/// "Land: 3 · Water: 5 · Coastal: 1"
pub fn counts_text(counts: &TerrainCounts) -> String {
    format!(
        "Land: {} \u{00b7} Water: {} \u{00b7} {}: {}",
        counts.land,
        counts.water,
        TerrainClass::Both.display_name(),
        counts.both
    )
}

/// Popup line for the current class, marked once it has been edited.
pub fn popup_terrain_text(class: TerrainClass, updated: bool) -> String {
    if updated {
        format!("{} (Updated)", class)
    } else {
        class.to_string()
    }
}

/// Side controls for the terrain editor.
#[component]
pub fn EditorPanel(
    data: Signal<MapData>,
    viewport: Signal<Viewport>,
    controller: Signal<InteractionController>,
    readout: ReadSignal<Option<String>>,
) -> Element {
    let json = use_memo(move || data.read().terrain.serialize().to_string());

    let counts = data.read().terrain.counts();
    let zoom_label = viewport.read().zoom_label();
    let status = controller.read().status().unwrap_or("Click a cell to edit its terrain").to_string();
    let hover = readout.read().clone().unwrap_or_default();

    rsx! {
        div { class: "editor-panel",
            h2 { "Terrain Editor" }
            div { class: "editor-row",
                span { "Zoom: " }
                span { id: "zoom-level", "{zoom_label}" }
            }
            div { class: "editor-row", id: "terrain-counts", "{counts_text(&counts)}" }
            div { class: "editor-row coordinate-readout", "{hover}" }
            div { id: "status-bar", class: "status-bar", "{status}" }

            textarea {
                id: "json-output",
                readonly: true,
                spellcheck: false,
                value: "{json}",
            }
            button {
                id: "copy-json-btn",
                onclick: move |_| {
                    let text = json.read().clone();
                    spawn(async move {
                        let message = match api::copy_to_clipboard(&text).await {
                            Ok(()) => COPIED_STATUS.to_string(),
                            Err(e) => e,
                        };
                        controller.write().set_status(message);
                    });
                },
                "Copy JSON"
            }
        }
    }
}

/// Class picker shown where the user clicked.
#[component]
pub fn EditPopupView(data: Signal<MapData>, controller: Signal<InteractionController>) -> Element {
    // Bumped on every edit so only the latest edit's timer hides the popup.
    let mut edit_seq = use_signal(|| 0u64);

    let Some(popup) = controller.read().popup().copied() else {
        return rsx! {};
    };
    let key = popup.reference.key();
    let left = popup.screen.x + 15.0;
    let top = popup.screen.y;

    rsx! {
        div {
            id: "editor-popup",
            class: "editor-popup",
            style: "left: {left}px; top: {top}px;",
            onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
            onmouseup: move |evt: Event<MouseData>| evt.stop_propagation(),

            h4 { "{key}" }
            p {
                strong { "Lat/Lon: " }
                "{popup.reference.format_lat_lon()}"
            }
            p {
                strong { "Current Type: " }
                span { id: "popup-terrain-type", "{popup_terrain_text(popup.terrain, popup.updated)}" }
            }
            div { class: "popup-buttons",
                for class in TerrainClass::EDITABLE {
                    button {
                        class: "terrain-btn {class.as_str()}",
                        onclick: move |_| {
                            let result = controller.write().apply_edit(&mut data.write().terrain, class);
                            match result {
                                Ok(_) => {
                                    let seq = *edit_seq.peek() + 1;
                                    edit_seq.set(seq);
                                    spawn(async move {
                                        TimeoutFuture::new(POPUP_HIDE_MS).await;
                                        if *edit_seq.peek() == seq {
                                            controller.write().hide_popup();
                                        }
                                    });
                                }
                                Err(e) => controller.write().set_status(e.to_string()),
                            }
                        },
                        "{class.icon()} {class.display_name()}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_text() {
        let counts = TerrainCounts {
            land: 3,
            water: 5,
            both: 1,
        };
        assert_eq!(counts_text(&counts), "Land: 3 \u{00b7} Water: 5 \u{00b7} Coastal: 1");
    }

    #[test]
    fn test_popup_terrain_text() {
        assert_eq!(popup_terrain_text(TerrainClass::Water, false), "water");
        assert_eq!(popup_terrain_text(TerrainClass::Both, true), "both (Updated)");
    }
}
