use dioxus::prelude::*;
use gridmap_shared::interaction::{InteractionController, KeyCommand};
use gridmap_shared::viewport::Viewport;

/// Zoom, pan and reset buttons over the map.
#[component]
pub fn MapToolbar(
    viewport: Signal<Viewport>,
    controller: Signal<InteractionController>,
    show_help: Signal<bool>,
) -> Element {
    let mut press = move |cmd: KeyCommand| {
        controller.write().key(&mut viewport.write(), cmd);
    };
    let mut collapsed = use_signal(|| false);

    if *collapsed.read() {
        return rsx! {
            button {
                id: "toolbar-expand-btn",
                class: "map-toolbar-toggle",
                title: "Show controls",
                onclick: move |_| collapsed.set(false),
                "\u{2630}"
            }
        };
    }

    rsx! {
        div { class: "map-toolbar",
            button { id: "zoom-in-btn", title: "Zoom in", onclick: move |_| press(KeyCommand::ZoomIn), "+" }
            button { id: "zoom-out-btn", title: "Zoom out", onclick: move |_| press(KeyCommand::ZoomOut), "\u{2212}" }
            div { class: "pan-controls",
                button { id: "pan-up-btn", title: "Pan up", onclick: move |_| press(KeyCommand::PanUp), "\u{25b2}" }
                button { id: "pan-left-btn", title: "Pan left", onclick: move |_| press(KeyCommand::PanLeft), "\u{25c0}" }
                button { id: "pan-right-btn", title: "Pan right", onclick: move |_| press(KeyCommand::PanRight), "\u{25b6}" }
                button { id: "pan-down-btn", title: "Pan down", onclick: move |_| press(KeyCommand::PanDown), "\u{25bc}" }
            }
            button {
                id: "reset-view-btn",
                title: "Reset view",
                onclick: move |_| {
                    controller.write().dismiss();
                    viewport.write().reset();
                },
                "\u{27f2}"
            }
            button {
                id: "toolbar-collapse-btn",
                title: "Hide controls",
                onclick: move |_| collapsed.set(true),
                "\u{00d7}"
            }
        }
        button {
            id: "help-button",
            class: "help-button",
            title: "Help",
            onclick: move |_| show_help.set(true),
            "?"
        }
    }
}
