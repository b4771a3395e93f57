use dioxus::prelude::*;
use gridmap_shared::dataset::MapData;
use gridmap_shared::interaction::{InteractionController, Mode};
use gridmap_shared::overlay::LayerToggles;
use gridmap_shared::viewport::{Viewport, ViewportConfig};

use crate::components::editor_panel::{EditPopupView, EditorPanel};
use crate::components::help_overlay::HelpOverlay;
use crate::components::map_view::MapView;
use crate::components::toolbar::MapToolbar;
use crate::coords;
use crate::pages::{refresh, show_refresh_status, DEFAULT_WINDOW};

/// The editor paints terrain over the grid; markers stay hidden.
const EDITOR_LAYERS: LayerToggles = LayerToggles {
    ports: false,
    entities: false,
    grid: true,
    terrain: true,
};

#[component]
pub fn EditorPage() -> Element {
    let viewport = use_signal(|| {
        let (w, h) = coords::window_size().unwrap_or(DEFAULT_WINDOW);
        Viewport::new(ViewportConfig::EDITOR, w, h)
    });
    let data = use_signal(MapData::default);
    let mut controller = use_signal(|| InteractionController::new(Mode::Editor));
    let toggles = use_signal(|| EDITOR_LAYERS);
    let readout = use_signal(|| None::<String>);
    let show_help = use_signal(|| false);

    // Loaded once; a refresh would overwrite unsaved edits.
    use_future(move || async move {
        let result = refresh(data).await;
        show_refresh_status(&mut controller.write(), &result);
    });

    rsx! {
        div { class: "app editor",
            div { class: "map-area",
                MapView { viewport, data, controller, toggles, readout,
                    EditPopupView { data, controller }
                }
                MapToolbar { viewport, controller, show_help }
            }
            EditorPanel { data, viewport, controller, readout }
            HelpOverlay { show: show_help, mode: Mode::Editor }
        }
    }
}
