mod api;
mod components;
mod coords;
mod pages;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Viewer {},
    #[route("/editor")]
    Editor {},
}

#[component]
fn Viewer() -> Element {
    rsx! {
        pages::viewer::ViewerPage {}
    }
}

#[component]
fn Editor() -> Element {
    rsx! {
        pages::editor::EditorPage {}
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
