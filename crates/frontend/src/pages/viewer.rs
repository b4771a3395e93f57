use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use gridmap_shared::dataset::MapData;
use gridmap_shared::interaction::{InteractionController, Mode};
use gridmap_shared::overlay::LayerToggles;
use gridmap_shared::viewport::{Viewport, ViewportConfig};

use crate::components::help_overlay::HelpOverlay;
use crate::components::map_view::MapView;
use crate::components::minimap::Minimap;
use crate::components::sidebar::Sidebar;
use crate::components::toolbar::MapToolbar;
use crate::coords;
use crate::pages::{refresh, show_refresh_status, DEFAULT_WINDOW};

const REFRESH_INTERVAL_MS: u32 = 60_000;

#[component]
pub fn ViewerPage() -> Element {
    let viewport = use_signal(|| {
        let (w, h) = coords::window_size().unwrap_or(DEFAULT_WINDOW);
        Viewport::new(ViewportConfig::VIEWER, w, h)
    });
    let data = use_signal(MapData::default);
    let mut controller = use_signal(|| InteractionController::new(Mode::Viewer));
    let toggles = use_signal(LayerToggles::default);
    let readout = use_signal(|| None::<String>);
    let show_help = use_signal(|| false);
    let mut loading = use_signal(|| false);

    // Initial load, then a refresh every minute. Refreshes don't wait on
    // each other beyond the sleep.
    use_future(move || async move {
        loop {
            loading.set(true);
            let result = refresh(data).await;
            show_refresh_status(&mut controller.write(), &result);
            loading.set(false);
            TimeoutFuture::new(REFRESH_INTERVAL_MS).await;
        }
    });

    let status = controller.read().status().map(str::to_string);

    rsx! {
        div { class: "app viewer",
            Sidebar { data, viewport, controller, toggles, loading }

            div { class: "map-area",
                MapView { viewport, data, controller, toggles, readout }
                MapToolbar { viewport, controller, show_help }
                Minimap { data, viewport, toggles }
                if let Some(status) = status {
                    div { class: "status-banner", "{status}" }
                }
            }

            HelpOverlay { show: show_help, mode: Mode::Viewer }
        }
    }
}
