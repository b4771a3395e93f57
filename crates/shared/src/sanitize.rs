//! Checks applied to every record from the data documents before it can
//! reach the page.

use serde_json::Value;

use crate::grid::{MAP_HEIGHT, MAP_WIDTH};
use crate::models::{Entity, Faction, Port};

pub const MAX_ID_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_COUNTRY_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_IMAGE_LEN: usize = 100;
pub const MAX_DOM_ID_LEN: usize = 50;

pub const DEFAULT_IMAGE: &str = "images/default.png";
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "svg"];

/// Escape text for interpolation into HTML or SVG markup.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Trim, then cut to at most `max_len` characters.
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    text.trim().chars().take(max_len).collect()
}

/// Reduce an untrusted file name to a path inside `images/`.
pub fn sanitize_image_path(filename: &str) -> String {
    let safe: String = filename
        .replace("..", "")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let has_image_ext = safe
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if has_image_ext {
        format!("images/{safe}")
    } else {
        DEFAULT_IMAGE.to_string()
    }
}

/// Normalize a free-form country name onto the faction whitelist.
pub fn sanitize_faction(country: &str) -> Faction {
    let normalized = country
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let slug: String = normalized
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == '-')
        .collect();
    Faction::from_slug(&slug).unwrap_or(Faction::Independent)
}

/// Element id fragment: at most 50 characters of `[A-Za-z0-9_-]`.
pub fn sanitize_dom_id(id: &str) -> String {
    sanitize_text(id, MAX_DOM_ID_LEN)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

fn required_str<'a>(record: &'a Value, field: &str, max_len: usize) -> Option<&'a str> {
    let s = record.get(field)?.as_str()?;
    (!s.is_empty() && s.chars().count() <= max_len).then_some(s)
}

/// Optional string field. `None` means the record must be rejected.
fn optional_str<'a>(record: &'a Value, field: &str, max_len: usize) -> Option<&'a str> {
    match record.get(field) {
        None | Some(Value::Null) => Some(""),
        Some(Value::String(s)) if s.chars().count() <= max_len => Some(s),
        Some(Value::String(_)) => None,
        // Non-string values are ignored rather than rendered.
        Some(_) => Some(""),
    }
}

fn coordinate(record: &Value, field: &str, max: f64) -> Option<f64> {
    let v = record.get(field)?.as_f64()?;
    (0.0..=max).contains(&v).then_some(v)
}

/// Validate and sanitize one record of `ports.json`.
pub fn validate_port(record: &Value) -> Option<Port> {
    let id = required_str(record, "id", MAX_ID_LEN)?;
    let city = required_str(record, "city", MAX_NAME_LEN)?;
    let country = required_str(record, "country", MAX_COUNTRY_LEN)?;
    let description = optional_str(record, "description", MAX_DESCRIPTION_LEN)?;
    let x = coordinate(record, "x", MAP_WIDTH)?;
    let y = coordinate(record, "y", MAP_HEIGHT)?;

    Some(Port {
        id: id.to_string(),
        city: sanitize_text(city, MAX_NAME_LEN),
        country: sanitize_text(country, MAX_COUNTRY_LEN),
        faction: sanitize_faction(country),
        x,
        y,
        description: sanitize_text(description, MAX_DESCRIPTION_LEN),
    })
}

/// Validate and sanitize one record of `entities.json`.
pub fn validate_entity(record: &Value) -> Option<Entity> {
    let id = required_str(record, "id", MAX_ID_LEN)?;
    let name = required_str(record, "name", MAX_NAME_LEN)?;
    let description = optional_str(record, "description", MAX_DESCRIPTION_LEN)?;
    let image = optional_str(record, "image", MAX_IMAGE_LEN)?;
    let x = coordinate(record, "x", MAP_WIDTH)?;
    let y = coordinate(record, "y", MAP_HEIGHT)?;

    let image = if image.is_empty() {
        DEFAULT_IMAGE.to_string()
    } else {
        sanitize_image_path(image)
    };

    Some(Entity {
        id: id.to_string(),
        name: sanitize_text(name, MAX_NAME_LEN),
        x,
        y,
        description: sanitize_text(description, MAX_DESCRIPTION_LEN),
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<img src="x" onerror='a&b'>"#),
            "&lt;img src=&quot;x&quot; onerror=&#039;a&amp;b&#039;&gt;"
        );
        assert_eq!(escape_html("Port Royal"), "Port Royal");
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  hello  ", 100), "hello");
        assert_eq!(sanitize_text("abcdef", 3), "abc");
        assert_eq!(sanitize_text("ñandú", 2), "ña");
    }

    #[test]
    fn test_sanitize_image_path() {
        assert_eq!(sanitize_image_path("ship.png"), "images/ship.png");
        assert_eq!(sanitize_image_path("../../etc/passwd"), DEFAULT_IMAGE);
        assert_eq!(sanitize_image_path("../secret/kraken.JPG"), "images/secretkraken.JPG");
        assert_eq!(sanitize_image_path("a b<script>.gif"), "images/abscript.gif");
        assert_eq!(sanitize_image_path("run.exe"), DEFAULT_IMAGE);
        assert_eq!(sanitize_image_path(""), DEFAULT_IMAGE);
    }

    #[test]
    fn test_sanitize_faction() {
        assert_eq!(sanitize_faction("England"), Faction::England);
        assert_eq!(sanitize_faction("  SPAIN "), Faction::Spain);
        assert_eq!(sanitize_faction("Netherlands"), Faction::Netherlands);
        assert_eq!(sanitize_faction("Holy Roman Empire"), Faction::Independent);
        assert_eq!(sanitize_faction("<b>pirate</b>"), Faction::Independent);
        assert_eq!(sanitize_faction(""), Faction::Independent);
    }

    #[test]
    fn test_sanitize_dom_id() {
        assert_eq!(sanitize_dom_id("port royal!"), "portroyal");
        assert_eq!(sanitize_dom_id(&"x".repeat(80)).len(), 50);
    }

    #[test]
    fn test_validate_port_accepts() {
        let port = validate_port(&json!({
            "id": "havana",
            "city": "Havana",
            "country": "Spain",
            "x": 1200,
            "y": 800.5,
            "description": "  Treasure fleet anchorage "
        }))
        .unwrap();
        assert_eq!(port.faction, Faction::Spain);
        assert_eq!(port.country, "Spain");
        assert_eq!(port.description, "Treasure fleet anchorage");
        assert!((port.x - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_port_rejects() {
        let base = json!({"id": "a", "city": "A", "country": "France", "x": 1.0, "y": 1.0});
        assert!(validate_port(&base).is_some());

        let mut missing = base.clone();
        missing.as_object_mut().unwrap().remove("city");
        assert!(validate_port(&missing).is_none());

        let mut out_of_bounds = base.clone();
        out_of_bounds["x"] = json!(MAP_WIDTH + 1.0);
        assert!(validate_port(&out_of_bounds).is_none());

        let mut negative = base.clone();
        negative["y"] = json!(-0.5);
        assert!(validate_port(&negative).is_none());

        let mut stringly = base.clone();
        stringly["x"] = json!("10");
        assert!(validate_port(&stringly).is_none());

        let mut long_country = base.clone();
        long_country["country"] = json!("c".repeat(51));
        assert!(validate_port(&long_country).is_none());

        let mut long_desc = base.clone();
        long_desc["description"] = json!("d".repeat(1001));
        assert!(validate_port(&long_desc).is_none());

        assert!(validate_port(&json!("havana")).is_none());
    }

    #[test]
    fn test_validate_entity() {
        let e = validate_entity(&json!({
            "id": "ghost-ship",
            "name": "Ghost Ship",
            "x": 3840,
            "y": 0,
            "image": "../ghost.png"
        }))
        .unwrap();
        assert_eq!(e.image, "images/ghost.png");
        assert_eq!(e.description, "");

        let no_image = validate_entity(&json!({"id": "s", "name": "Storm", "x": 5, "y": 5})).unwrap();
        assert_eq!(no_image.image, DEFAULT_IMAGE);

        assert!(validate_entity(&json!({"id": "s", "x": 5, "y": 5})).is_none());
        assert!(validate_entity(&json!({"id": "s", "name": "n", "x": 5, "y": 2499})).is_none());
        assert!(validate_entity(&json!({
            "id": "s", "name": "n", "x": 5, "y": 5, "image": "i".repeat(101)
        }))
        .is_none());
    }
}
