use gridmap_shared::viewport::ScreenPoint;

/// Convert client (page) coordinates to coordinates relative to a container's
/// top-left corner.
pub fn client_to_container(client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) -> ScreenPoint {
    ScreenPoint::new(client_x - rect_left, client_y - rect_top)
}

/// Container-relative point for a pointer event, looked up through the DOM.
pub fn client_to_viewport(client_x: f64, client_y: f64, container_id: &str) -> Option<ScreenPoint> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();
    Some(client_to_container(client_x, client_y, rect.left(), rect.top()))
}

/// Midpoint of two touches.
pub fn midpoint(a: ScreenPoint, b: ScreenPoint) -> ScreenPoint {
    ScreenPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Window inner size in CSS pixels.
pub fn window_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w, h))
}

/// Monotonic milliseconds for double-click timing.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
