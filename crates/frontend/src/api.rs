use std::future::Future;

use gridmap_shared::dataset::MapDocuments;
use serde_json::Value;

/// Build the URL of one data document.
pub fn document_url(origin: &str, name: &str) -> String {
    format!("{}/data/{}.json", origin, name)
}

fn origin() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    window
        .location()
        .origin()
        .map_err(|_| "could not read page origin".to_string())
}

async fn fetch_document(client: &reqwest::Client, origin: &str, name: &str) -> Result<Value, String> {
    let resp = client
        .get(document_url(origin, name))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.status().is_success() {
        return Err(format!("{}.json: HTTP {}", name, resp.status()));
    }

    resp.json().await.map_err(|e| format!("{}.json: {}", name, e))
}

/// Run one fetch per document at once and join them. Any failure fails the
/// whole refresh so a partial set is never applied.
async fn join_documents<F, Fut>(fetch: F) -> Result<MapDocuments, String>
where
    F: Fn(&'static str) -> Fut,
    Fut: Future<Output = Result<Value, String>>,
{
    let (ports, entities, grid, terrain) =
        futures::try_join!(fetch("ports"), fetch("entities"), fetch("grid"), fetch("terrain"))?;

    Ok(MapDocuments {
        ports,
        entities,
        grid,
        terrain,
    })
}

/// Fetch all four documents concurrently.
pub async fn fetch_documents() -> Result<MapDocuments, String> {
    let origin = origin()?;
    let client = reqwest::Client::new();
    let (client, origin) = (&client, origin.as_str());
    join_documents(move |name| fetch_document(client, origin, name)).await
}

/// Copy text to the system clipboard.
pub async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let clipboard = window.navigator().clipboard();
    wasm_bindgen_futures::JsFuture::from(clipboard.write_text(text))
        .await
        .map(|_| ())
        .map_err(|_| "Failed to copy JSON".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        assert_eq!(
            document_url("http://localhost:3000", "terrain"),
            "http://localhost:3000/data/terrain.json"
        );
    }

    #[test]
    fn test_document_url_trailing_origin() {
        assert_eq!(document_url("", "ports"), "/data/ports.json");
    }

    #[test]
    fn test_join_documents_fills_every_slot() {
        let docs = futures::executor::block_on(join_documents(|name| async move {
            Ok(serde_json::json!({ "doc": name }))
        }))
        .unwrap();
        assert_eq!(docs.ports["doc"], "ports");
        assert_eq!(docs.entities["doc"], "entities");
        assert_eq!(docs.grid["doc"], "grid");
        assert_eq!(docs.terrain["doc"], "terrain");
    }

    #[test]
    fn test_join_documents_fails_whole_set() {
        let result = futures::executor::block_on(join_documents(|name| async move {
            if name == "grid" {
                Err("grid.json: HTTP 500".to_string())
            } else {
                Ok(serde_json::json!([]))
            }
        }));
        assert_eq!(result.unwrap_err(), "grid.json: HTTP 500");
    }
}
